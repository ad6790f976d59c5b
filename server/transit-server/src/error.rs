use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use billing_service::BillingError;
use booking_service::BookingError;
use database_layer::DatabaseError;
use error_common::codes;
use insurance_service::InsuranceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Always false
    pub success: bool,
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Stable machine-readable code
    pub error_code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    /// Request is well formed but the resource is in the wrong state
    #[error("{message}")]
    InvalidState { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    /// Create a validation error with field-specific errors
    pub fn validation_with_fields(
        message: impl Into<String>,
        field_errors: HashMap<String, Vec<String>>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. }
            | ApiError::InvalidState { .. }
            | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database(db_err) => match db_err {
                DatabaseError::ConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
                DatabaseError::SqlxError(sqlx::Error::PoolTimedOut) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                e if e.is_unique_violation() => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::InvalidState { .. } => "invalid_state",
            ApiError::Database(_) => "database_error",
            ApiError::Internal { .. } => "internal_error",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::BadRequest { .. } => "bad_request",
        }
    }

    /// Stable code from `error_common::codes`
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => {
                codes::validation::INVALID_INPUT
            }
            ApiError::Authentication { .. } => codes::authentication::INVALID_CREDENTIALS,
            ApiError::Authorization { .. } => codes::authorization::ACCESS_DENIED,
            ApiError::NotFound { .. } => codes::business::NOT_FOUND,
            ApiError::Conflict { .. } => codes::business::CONFLICT,
            ApiError::InvalidState { .. } => codes::business::INVALID_STATE,
            ApiError::Database(DatabaseError::ConnectionFailed(_)) => {
                codes::database::CONNECTION_FAILED
            }
            ApiError::Database(e) if e.is_unique_violation() => {
                codes::database::CONSTRAINT_VIOLATION
            }
            ApiError::Database(_) => codes::database::QUERY_FAILED,
            ApiError::Internal { .. } => codes::system::INTERNAL,
            ApiError::ServiceUnavailable { .. } => codes::system::UNAVAILABLE,
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. } => Some(vec![
                "Check the request payload for invalid fields".to_string(),
                "Ensure all required fields are provided".to_string(),
            ]),
            ApiError::Authentication { .. } => Some(vec![
                "Sign in again to obtain a new token".to_string(),
                "Send the token as 'Authorization: Bearer <token>'".to_string(),
            ]),
            ApiError::Authorization { .. } => Some(vec![
                "Patients may only access their own records".to_string(),
            ]),
            ApiError::NotFound { .. } => Some(vec!["Verify the resource ID is correct".to_string()]),
            ApiError::Database(DatabaseError::ConnectionFailed(_))
            | ApiError::ServiceUnavailable { .. } => Some(vec![
                "Try again in a few moments".to_string(),
                "Contact support if the issue persists".to_string(),
            ]),
            _ => None,
        }
    }

    /// Client-facing message for database failures
    ///
    /// Driver and server text never reaches the response body; it is logged
    /// under the error id instead.
    pub fn format_database_error(db_error: &DatabaseError) -> String {
        match db_error {
            DatabaseError::ConnectionFailed(_) | DatabaseError::SqlxError(sqlx::Error::PoolTimedOut) => {
                "The database is temporarily unavailable.".to_string()
            }
            e if e.is_unique_violation() => "A record with these details already exists.".to_string(),
            DatabaseError::SqlxError(sqlx::Error::RowNotFound) => {
                "Requested record not found.".to_string()
            }
            _ => "Database operation failed. Please try again.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %logger_redacted::redact(&self.to_string()),
                "Request rejected"
            );
        }

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let message = match &self {
            ApiError::Database(db_err) => ApiError::format_database_error(db_err),
            ApiError::Internal { .. } => "An internal error occurred.".to_string(),
            _ => self.to_string(),
        };

        let error_response = ApiErrorResponse {
            success: false,
            error_id,
            error_type: self.error_type().to_string(),
            error_code: self.error_code().to_string(),
            message,
            field_errors,
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Successful list response carrying its length
pub fn api_list<T>(data: Vec<T>) -> ApiResponse<Vec<T>> {
    let total_count = i64::try_from(data.len()).ok();
    ApiResponse {
        success: true,
        data,
        metadata: Some(ResponseMetadata { total_count }),
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(sqlx_error: sqlx::Error) -> Self {
        ApiError::Database(DatabaseError::SqlxError(sqlx_error))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::BadRequest {
            message: format!("Invalid JSON: {}", error),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Validation(message) => ApiError::validation(message),
            BookingError::OutsideBusinessHours { .. }
            | BookingError::DriverUnavailable { .. } => ApiError::validation(error.to_string()),
            BookingError::InvalidTransition { .. } => ApiError::invalid_state(error.to_string()),
            BookingError::PatientNotFound(_) => ApiError::not_found("patient"),
            BookingError::TripNotFound(_) => ApiError::not_found("trip"),
            BookingError::DriverNotFound(_) => ApiError::not_found("driver"),
            BookingError::PhoneAlreadyRegistered => ApiError::conflict(error.to_string()),
            BookingError::InvalidCredentials => ApiError::authentication(error.to_string()),
            BookingError::Credentials(_) | BookingError::NumberExhausted(_) => {
                ApiError::internal(error.to_string())
            }
            BookingError::Database(e) => e.into(),
            BookingError::DatabaseLayer(e) => ApiError::Database(e),
        }
    }
}

impl From<InsuranceError> for ApiError {
    fn from(error: InsuranceError) -> Self {
        match error {
            InsuranceError::Validation(message) => ApiError::validation(message),
            InsuranceError::PatientNotFound(_) => ApiError::not_found("patient"),
            InsuranceError::NoCoverage(_) => ApiError::not_found("No insurance on file"),
            InsuranceError::Eligibility(_) => ApiError::service_unavailable(error.to_string()),
            InsuranceError::Database(e) => e.into(),
            InsuranceError::DatabaseLayer(e) => ApiError::Database(e),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(error: BillingError) -> Self {
        match error {
            BillingError::Validation(message) => ApiError::validation(message),
            BillingError::TripNotCompleted(_)
            | BillingError::NoActiveInsurance
            | BillingError::NoRateSchedule { .. }
            | BillingError::InvalidTransition { .. } => ApiError::invalid_state(error.to_string()),
            BillingError::TripNotFound(_) => ApiError::not_found("trip"),
            BillingError::ClaimNotFound(_) => ApiError::not_found("claim"),
            BillingError::DuplicateClaim { claim_id } => {
                ApiError::conflict(format!("Claim already exists for this trip: {claim_id}"))
            }
            BillingError::NumberExhausted(_) => ApiError::internal(error.to_string()),
            BillingError::Database(e) => e.into(),
            BillingError::DatabaseLayer(e) => ApiError::Database(e),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use booking_service::TripStatus;
    use chrono::NaiveTime;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn booking_errors_map_to_status_codes() {
        let outside = BookingError::OutsideBusinessHours {
            field: "appointment_time",
            time: NaiveTime::from_hms_opt(5, 30, 0).unwrap(),
            open: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        };
        assert_eq!(ApiError::from(outside).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(BookingError::PhoneAlreadyRegistered).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(BookingError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(BookingError::TripNotFound(Uuid::new_v4())).status_code(),
            StatusCode::NOT_FOUND
        );
        let transition = BookingError::InvalidTransition {
            from: TripStatus::Completed,
            action: "cancel",
        };
        assert_eq!(ApiError::from(transition).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn billing_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(BillingError::DuplicateClaim { claim_id: Uuid::new_v4() }).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(BillingError::NoActiveInsurance).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(BillingError::ClaimNotFound(Uuid::new_v4())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn insurance_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(InsuranceError::NoCoverage(Uuid::new_v4())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(InsuranceError::Validation("policy_number is required".into()))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn pool_exhaustion_is_unavailable() {
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn database_text_is_not_echoed() {
        let err = ApiError::Database(DatabaseError::QueryFailed(
            "relation \"medical.patients\" does not exist".into(),
        ));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("medical.patients"));
        assert!(body["error_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn validation_body_carries_code_and_message() {
        let (status, body) = body_json(ApiError::validation("days must be between 1 and 365")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "validation_error");
        assert_eq!(body["error_code"], codes::validation::INVALID_INPUT);
        assert!(body["message"].as_str().unwrap().contains("days must be between"));
    }

    #[tokio::test]
    async fn service_validation_messages_are_not_prefixed_twice() {
        let errors = [
            ApiError::from(BookingError::Validation("phone must contain at least 10 digits".into())),
            ApiError::from(BillingError::Validation("mileage must be positive".into())),
            ApiError::from(InsuranceError::Validation("policy_number is required".into())),
        ];
        let expected = [
            "Validation error: phone must contain at least 10 digits",
            "Validation error: mileage must be positive",
            "Validation error: policy_number is required",
        ];
        for (error, expected) in errors.into_iter().zip(expected) {
            let (status, body) = body_json(error).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], expected);
        }
    }

    #[test]
    fn list_metadata_counts_items() {
        let response = api_list(vec![1, 2, 3]);
        assert_eq!(response.metadata.and_then(|m| m.total_count), Some(3));
    }
}
