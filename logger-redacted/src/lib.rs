//! PII redaction for log output
//!
//! Patient phone numbers, email addresses, medical record numbers and
//! insurance policy numbers must never reach log sinks verbatim. Call sites
//! pass values through [`redact`] or [`mask_identifier`] before handing them
//! to `tracing`.
//!
//! ```rust
//! use logger_redacted::{mask_identifier, redact};
//!
//! let line = redact("booking for (555) 123-4567");
//! assert!(!line.contains("123-4567"));
//! assert_eq!(mask_identifier("XYZ123456789"), "********6789");
//! ```

pub mod redactor;

pub use redactor::*;

use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_REDACTOR: PiiRedactor = PiiRedactor::new(RedactionConfig::default());
}

/// Redact free text with the default configuration
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}

/// Keep only the last four characters of an identifier
pub fn mask_identifier(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < count - 4 { '*' } else { c })
        .collect()
}
