//! Request validation utilities for consistent validation across handlers
//!
//! A `RequestValidation` trait plus helper macros so that every handler
//! rejects bad input with the same `ApiError::Validation` shape.

use crate::error::ApiError;

/// Trait for validating request payloads
pub trait RequestValidation {
    /// Returns `Err(ApiError::Validation)` describing the first failed rule
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// ```rust,ignore
/// validate_field!(self.email, self.email.contains('@'), "Invalid email format");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating UUID fields (non-nil)
#[macro_export]
macro_rules! validate_uuid {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.is_nil(), $message);
    };
}

/// Macro for validating string length in characters
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating email format (basic check)
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, $field.contains('@'), $message);
    };
}

/// Macro for validating numeric ranges (inclusive)
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($field, $field >= $min && $field <= $max, $message);
    };
}
