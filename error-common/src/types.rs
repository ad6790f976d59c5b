use thiserror::Error;

/// Process-level error enum used by binaries and startup code
#[derive(Error, Debug)]
pub enum TransitError {
    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server startup and runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransitError {
    /// Stable code reported alongside the message
    pub fn code(&self) -> &'static str {
        use crate::codes;
        match self {
            Self::NetworkError(_) => codes::system::NETWORK_FAILURE,
            Self::ServerError(_) | Self::InternalError(_) | Self::Other(_) => {
                codes::system::INTERNAL
            }
            Self::DatabaseError(_) => codes::database::QUERY_FAILED,
            Self::ValidationError(_) => codes::validation::INVALID_INPUT,
            Self::ConfigError(_) => codes::system::CONFIGURATION,
        }
    }
}

/// Result type alias for Transit Engine operations
pub type Result<T> = std::result::Result<T, TransitError>;

/// Log an error with the surrounding context
pub fn log_error(context: &str, error: &TransitError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "Transit error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_variant() {
        assert_eq!(
            TransitError::ConfigError("x".into()).code(),
            crate::codes::system::CONFIGURATION
        );
        assert_eq!(
            TransitError::DatabaseError("x".into()).code(),
            crate::codes::database::QUERY_FAILED
        );
    }

    #[test]
    fn anyhow_errors_are_wrapped() {
        let err: TransitError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.code(), crate::codes::system::INTERNAL);
    }
}
