use crate::models::ClaimStatus;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("Claim not found: {0}")]
    ClaimNotFound(Uuid),

    #[error("Trip {0} is not completed")]
    TripNotCompleted(Uuid),

    #[error("No active insurance found for patient")]
    NoActiveInsurance,

    #[error("No rate schedule found for {payer_type} - {service_type}")]
    NoRateSchedule {
        payer_type: String,
        service_type: String,
    },

    #[error("Claim already exists for this trip")]
    DuplicateClaim { claim_id: Uuid },

    #[error("Claim is {from}; cannot {action}")]
    InvalidTransition { from: ClaimStatus, action: &'static str },

    #[error("Could not allocate a unique {0} number")]
    NumberExhausted(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database layer error: {0}")]
    DatabaseLayer(#[from] database_layer::DatabaseError),
}

pub type BillingResult<T> = Result<T, BillingError>;
