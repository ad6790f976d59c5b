use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum InsuranceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("No insurance on file for patient {0}")]
    NoCoverage(Uuid),

    #[error("Eligibility check error: {0}")]
    Eligibility(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database layer error: {0}")]
    DatabaseLayer(#[from] database_layer::DatabaseError),
}

pub type InsuranceResult<T> = Result<T, InsuranceError>;
