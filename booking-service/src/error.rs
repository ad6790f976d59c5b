use crate::models::TripStatus;
use chrono::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{field} {time} is outside business hours ({open} to {close})")]
    OutsideBusinessHours {
        field: &'static str,
        time: NaiveTime,
        open: NaiveTime,
        close: NaiveTime,
    },

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("Driver not found: {0}")]
    DriverNotFound(Uuid),

    #[error("Driver {driver_id} cannot take this trip: {reason}")]
    DriverUnavailable { driver_id: Uuid, reason: String },

    #[error("Cannot {action} a trip that is {from}")]
    InvalidTransition {
        from: TripStatus,
        action: &'static str,
    },

    #[error("A patient with this phone number is already registered")]
    PhoneAlreadyRegistered,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Could not allocate a unique {0}")]
    NumberExhausted(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database layer error: {0}")]
    DatabaseLayer(#[from] database_layer::DatabaseError),
}

pub type BookingResult<T> = Result<T, BookingError>;
