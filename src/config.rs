//! Process settings, read from the environment (and a `.env` file if present).

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, anyhow};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;
pub const DEFAULT_LOG_DIR: &str = "log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    /// Platform-managed hosting: listen on every interface, log to stdout only.
    pub heroku: bool,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
    pub request_timeout: Duration,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Settings> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Settings> {
        let heroku = lookup("HEROKU").is_some();

        let database_url =
            lookup("DATABASE_URL").ok_or(anyhow!("missing environment variable DATABASE_URL"))?;

        let ip = match lookup("D20_IP") {
            Some(ip) => ip
                .parse::<IpAddr>()
                .with_context(|| format!("D20_IP '{ip}' is not an IP address"))?,
            None if heroku => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            None => return Err(anyhow!("missing environment variable D20_IP")),
        };

        let port = lookup("PORT").ok_or(anyhow!("missing environment variable PORT"))?;
        let port: u16 = port
            .parse()
            .with_context(|| format!("PORT '{port}' is not a port number"))?;

        let log_dir = lookup("D20_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let request_timeout = match lookup("D20_REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .with_context(|| format!("D20_REQUEST_TIMEOUT_SECS '{secs}' is not a number"))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let max_connections = match lookup("D20_MAX_CONNECTIONS") {
            Some(n) => n
                .parse()
                .with_context(|| format!("D20_MAX_CONNECTIONS '{n}' is not a number"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Settings {
            database_url,
            heroku,
            bind_addr: SocketAddr::new(ip, port),
            log_dir,
            request_timeout: Duration::from_secs(request_timeout),
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn self_hosted() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://d20.db"),
            ("D20_IP", "127.0.0.1"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert!(!settings.heroku);
        assert_eq!(settings.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(settings.log_dir, PathBuf::from("log"));
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_connections, 16);
    }

    #[test]
    fn heroku_binds_everywhere() {
        let settings = Settings::from_lookup(lookup(&[
            ("HEROKU", ""),
            ("DATABASE_URL", "sqlite://d20.db"),
            ("PORT", "5000"),
        ]))
        .unwrap();

        assert!(settings.heroku);
        assert_eq!(settings.bind_addr, "0.0.0.0:5000".parse().unwrap());
    }

    #[test]
    fn self_hosted_needs_ip() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://d20.db"),
            ("PORT", "8080"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("D20_IP"));
    }

    #[test]
    fn port_and_database_are_required() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://d20.db"),
            ("HEROKU", "1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = Settings::from_lookup(lookup(&[("PORT", "1"), ("HEROKU", "1")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://d20.db"),
            ("HEROKU", "1"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("eighty"));

        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://d20.db"),
            ("HEROKU", "1"),
            ("PORT", "80"),
            ("D20_REQUEST_TIMEOUT_SECS", "5"),
            ("D20_MAX_CONNECTIONS", "2"),
            ("D20_LOG_DIR", "/var/log/d20"),
        ]))
        .unwrap();
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.max_connections, 2);
        assert_eq!(settings.log_dir, PathBuf::from("/var/log/d20"));
    }
}
