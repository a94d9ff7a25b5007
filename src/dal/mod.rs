//! Data-access layer.
//!
//! `DbManager` owns the pool and is the only place SQL is written. Driver
//! errors never leave this module as anything but [`DalError::Internal`];
//! missing rows become [`DalError::NotFound`] and conflicting inserts become
//! [`DalError::Duplicate`].

mod points;
mod users;

use std::{str::FromStr, time::Duration};

use sqlx::{
    Connection, Sqlite, SqlitePool,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::res::SCHEMA;

pub const USER: &str = "User";
pub const ROLL_NUMBER: &str = "RollNumber";

pub type DalResult<T> = Result<T, DalError>;

#[derive(Debug, thiserror::Error)]
pub enum DalError {
    #[error("Could not find resource '{name}' of type: '{kind}'")]
    NotFound { kind: &'static str, name: String },

    #[error("The resource '{name}' of type: '{kind}' already exists!")]
    Duplicate { kind: &'static str, name: String },

    #[error("storage failure: {0}")]
    Internal(#[source] sqlx::Error),
}

impl DalError {
    pub fn not_found(kind: &'static str, name: impl ToString) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub fn duplicate(kind: &'static str, name: impl ToString) -> Self {
        Self::Duplicate {
            kind,
            name: name.to_string(),
        }
    }
}

/// Logs the failing statement and wraps the driver error. The operation's
/// arguments are on the enclosing span.
fn internal(statement: &'static str, err: sqlx::Error) -> DalError {
    tracing::error!(query = statement, error = %err, "query failed");
    DalError::Internal(err)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|e| e.is_foreign_key_violation())
}

#[derive(Clone, Debug)]
pub struct DbManager {
    pool: SqlitePool,
}

impl DbManager {
    /// Opens the pool (creating the database file if needed) and checks that
    /// a connection can actually be made.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        pool.acquire().await?.ping().await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates missing tables and seeds the exercise list.
    pub async fn bootstrap(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn acquire(&self) -> DalResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| internal("acquire connection", e))
    }
}

/// A bootstrapped in-memory database. One connection, kept alive for the
/// whole test.
#[cfg(test)]
pub(crate) async fn memory() -> DbManager {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    let dm = DbManager::from_pool(pool);
    dm.bootstrap().await.unwrap();
    dm
}
