//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! config file, then `TRANSIT__*` environment variables
//! (`TRANSIT__JWT_SECRET`, `TRANSIT__TOKEN_TTL_SECS`, ...). The database URL
//! itself comes from [`database_layer::DatabaseConfig::from_env`].

use config::{Config, Environment, File};
use serde::Deserialize;

/// Minimum accepted length of the token signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// HS256 secret for portal tokens
    pub jwt_secret: String,
    /// Portal token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Overrides the pool size resolved from `DB_MAX_CONNECTIONS`
    pub max_connections: Option<u32>,
    /// Overrides the pool acquire timeout resolved from the environment
    pub acquire_timeout_secs: Option<u64>,
    /// Separate warehouse database for summary analytics
    pub analytics_database_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ServerConfig {
    /// Load from `path` (optional, any format the `config` crate reads) and
    /// the environment
    pub fn load(path: &str) -> Result<Self, ConfigLoadError> {
        let mut builder = Config::builder()
            .set_default("name", "Transit Engine")?
            .set_default("token_ttl_secs", 8 * 3600)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TRANSIT")
                    .separator("__")
                    .try_parsing(true),
            );

        // Plain variable kept for deployments that already set it.
        if let Ok(url) = std::env::var("ANALYTICS_DATABASE_URL") {
            builder = builder.set_override("analytics_database_url", url)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigLoadError::Invalid(format!(
                "jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters (set TRANSIT__JWT_SECRET)"
            )));
        }
        if self.token_ttl_secs <= 0 {
            return Err(ConfigLoadError::Invalid("token_ttl_secs must be positive".into()));
        }
        if self.max_connections == Some(0) {
            return Err(ConfigLoadError::Invalid("max_connections must be positive".into()));
        }
        Ok(())
    }

    /// Apply pool sizing to a database configuration
    pub fn apply_pool_settings(&self, database: &mut database_layer::DatabaseConfig) {
        if let Some(max) = self.max_connections {
            database.max_connections = max;
        }
        if let Some(timeout) = self.acquire_timeout_secs {
            database.acquire_timeout_secs = timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> ServerConfig {
        ServerConfig {
            name: "Transit Engine".into(),
            jwt_secret: secret.into(),
            token_ttl_secs: 3600,
            max_connections: Some(5),
            acquire_timeout_secs: None,
            analytics_database_url: None,
        }
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(config("too-short").validate().is_err());
        assert!(config(&"k".repeat(MIN_JWT_SECRET_LEN)).validate().is_ok());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let mut cfg = config(&"k".repeat(40));
        cfg.max_connections = Some(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn pool_settings_override_database_defaults() {
        let mut database = database_layer::DatabaseConfig::new("postgres://localhost/transit");
        config(&"k".repeat(40)).apply_pool_settings(&mut database);
        assert_eq!(database.max_connections, 5);
        assert_eq!(database.acquire_timeout_secs, 10);
    }
}
