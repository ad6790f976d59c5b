// Database configuration resolved from the environment
use crate::error::{DatabaseError, DatabaseResult};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }

    /// Resolve from `DATABASE_URL`, or from the `DB_*` component variables
    ///
    /// There is no fallback password: a missing `DB_PASSWORD` is an error.
    pub fn from_env() -> DatabaseResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DatabaseResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup("DATABASE_URL").filter(|u| !u.is_empty()) {
            Some(url) => url,
            None => {
                let required = |key: &str| {
                    lookup(key)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| DatabaseError::ConfigError(format!("{key} is not set")))
                };
                let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
                let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
                format!(
                    "postgres://{}:{}@{}:{}/{}",
                    required("DB_USERNAME")?,
                    required("DB_PASSWORD")?,
                    host,
                    port,
                    required("DB_NAME")?
                )
            }
        };

        let mut config = Self::new(url);
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            config.max_connections = max
                .parse()
                .map_err(|_| DatabaseError::ConfigError(format!("invalid DB_MAX_CONNECTIONS: {max}")))?;
        }
        if let Some(timeout) = lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            config.acquire_timeout_secs = timeout.parse().map_err(|_| {
                DatabaseError::ConfigError(format!("invalid DB_ACQUIRE_TIMEOUT_SECS: {timeout}"))
            })?;
        }
        Ok(config)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
