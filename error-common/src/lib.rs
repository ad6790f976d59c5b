//! Common error handling utilities for the Transit Engine
//!
//! Process-level error types and the stable error codes that API responses
//! carry. Service crates define their own domain error enums; this crate holds
//! what every binary and service shares.
//!
//! # Example
//!
//! ```rust
//! use error_common::{TransitError, codes};
//!
//! fn bind_port(port: &str) -> error_common::Result<u16> {
//!     port.parse::<u16>()
//!         .map_err(|e| TransitError::ConfigError(format!("invalid port {port}: {e}")))
//! }
//!
//! assert!(bind_port("8080").is_ok());
//! assert_eq!(codes::validation::INVALID_INPUT, "VALIDATION_1001");
//! ```

pub mod codes;
pub mod types;

pub use types::*;
