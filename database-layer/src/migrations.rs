// Embedded schema migrations
use crate::error::{DatabaseError, DatabaseResult};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run(pool: &PgPool) -> DatabaseResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!(count = MIGRATOR.iter().count(), "Database migrations applied");
    Ok(())
}
