//! Main-database connection configuration.

use std::time::Duration;

use sqlx::mysql::MySqlConnectOptions;

use tenantgate_core::generator::MainDbInfo;

/// Default MySQL port when `MAUTIC_DB_PORT` is unset.
pub const DEFAULT_PORT: u16 = 3306;

/// Name of the main database holding the tenant directory.
pub const DEFAULT_DATABASE: &str = "mautic_main";

/// A rejected environment variable. Values are never carried here;
/// `MAUTIC_DB_PASSWORD` must not end up in logs or panic messages.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set and non-empty")]
    MissingVar(&'static str),
    #[error("{0} must be {1}")]
    InvalidVar(&'static str, &'static str),
}

/// Connection parameters for the main database, sourced from the
/// process environment exactly once at startup. Components receive
/// this struct by value; nothing reads `MAUTIC_DB_*` ambiently.
#[derive(Debug, Clone)]
pub struct MainDbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound for a single directory query (and pool acquire).
    pub query_timeout: Duration,
}

impl MainDbConfig {
    /// Load from environment variables.
    ///
    /// | Env Var              | Default        |
    /// |----------------------|----------------|
    /// | `MAUTIC_DB_HOST`     | required       |
    /// | `MAUTIC_DB_PORT`     | `3306`         |
    /// | `MAUTIC_DB_USER`     | required       |
    /// | `MAUTIC_DB_PASSWORD` | required       |
    /// | `MAUTIC_DB_NAME`     | `mautic_main`  |
    /// | `DIRECTORY_TIMEOUT_SECS` | `5`        |
    ///
    /// Host, user, and password are validated non-empty before any
    /// connection attempt.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = require_non_empty("MAUTIC_DB_HOST")?;
        let user = require_non_empty("MAUTIC_DB_USER")?;
        let password = require_non_empty("MAUTIC_DB_PASSWORD")?;

        let port: u16 = match std::env::var("MAUTIC_DB_PORT") {
            Ok(raw) if !raw.is_empty() => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("MAUTIC_DB_PORT", "a valid port number"))?,
            _ => DEFAULT_PORT,
        };

        let database =
            std::env::var("MAUTIC_DB_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());

        let timeout_secs: u64 = match std::env::var("DIRECTORY_TIMEOUT_SECS") {
            Ok(raw) if !raw.is_empty() => raw.parse().map_err(|_| {
                ConfigError::InvalidVar("DIRECTORY_TIMEOUT_SECS", "a whole number of seconds")
            })?,
            _ => 5,
        };

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
            query_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// sqlx connect options. Built field by field so passwords never
    /// need URL-encoding.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// Trusted host/port pair written into generated artifacts as
    /// `db_host`/`db_port`.
    pub fn info(&self) -> MainDbInfo {
        MainDbInfo {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

fn require_non_empty(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}
