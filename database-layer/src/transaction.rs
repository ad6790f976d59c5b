// Explicit transaction management
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{Postgres, Transaction};
use tracing::debug;

/// Opens transactions that roll back unless committed
#[derive(Clone, Debug)]
pub struct TransactionManager {
    pool: DatabasePool,
}

impl TransactionManager {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Begin a new transaction
    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        debug!("Beginning transaction");

        self.pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to begin transaction: {}", e)))
    }
}
