//! Database layer for the Transit Engine
//!
//! Connection pooling, environment-driven configuration, transaction
//! management and the embedded schema migrations. Services receive a
//! [`DatabasePool`] and open explicit transactions through
//! [`TransactionManager`] for every multi-statement write; a transaction that
//! is dropped without `commit` rolls back.
//!
//! ```rust,no_run
//! use database_layer::{DatabaseConfig, DatabasePool, TransactionManager};
//!
//! # async fn run() -> database_layer::DatabaseResult<()> {
//! let config = DatabaseConfig::from_env()?;
//! let pool = DatabasePool::connect(&config).await?;
//! pool.run_migrations().await?;
//!
//! let mut tx = TransactionManager::new(pool.clone()).begin().await?;
//! sqlx::query("SELECT 1").execute(&mut *tx).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod transaction;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use transaction::*;
