use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

pub const LOG_FILE: &str = "D20Workout.log";

/// Stdout always; `<log_dir>/D20Workout.log` as well unless the platform
/// collects stdout for us. `RUST_LOG` overrides the default `info` filter.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    let file_layer = if settings.heroku {
        None
    } else {
        let file = open_log_file(&settings.log_dir)?;
        Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
}

pub fn open_log_file(log_dir: &Path) -> anyhow::Result<File> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let path = log_dir.join(LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))
}
