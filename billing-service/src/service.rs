use crate::error::{BillingError, BillingResult};
use crate::mileage::{MileageEstimator, RandomMileageEstimator};
use crate::models::ClaimStatus;
use database_layer::{DatabasePool, TransactionManager};
use sqlx::PgConnection;
use std::sync::Arc;
use uuid::Uuid;

/// Billing service
#[derive(Clone)]
pub struct BillingService {
    pub(crate) pool: DatabasePool,
    pub(crate) transactions: TransactionManager,
    pub(crate) mileage: Arc<dyn MileageEstimator>,
}

impl BillingService {
    /// Create a new billing service using the placeholder mileage estimator
    pub fn new(pool: DatabasePool) -> Self {
        Self::with_mileage_estimator(pool, Arc::new(RandomMileageEstimator))
    }

    pub fn with_mileage_estimator(pool: DatabasePool, mileage: Arc<dyn MileageEstimator>) -> Self {
        Self {
            transactions: TransactionManager::new(pool.clone()),
            pool,
            mileage,
        }
    }
}

/// Parse a stored claim status
pub(crate) fn parse_status(raw: &str) -> BillingResult<ClaimStatus> {
    raw.parse().map_err(BillingError::Validation)
}

/// Append one row to the claim status history
pub(crate) async fn record_transition(
    conn: &mut PgConnection,
    claim_id: Uuid,
    from: Option<ClaimStatus>,
    to: ClaimStatus,
    notes: &str,
) -> BillingResult<()> {
    sqlx::query(
        r#"
        INSERT INTO billing.claim_status_history (claim_id, from_status, to_status, notes)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(claim_id)
    .bind(from.map(ClaimStatus::as_str))
    .bind(to.as_str())
    .bind(notes)
    .execute(conn)
    .await?;
    Ok(())
}
