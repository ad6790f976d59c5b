//! Billing Service for transport revenue cycle management
//!
//! Provides billing capabilities including:
//! - Claim generation from completed trips, priced from the active rate schedule
//! - Claim submission and an append-only status history
//! - Payment posting with paid / partially paid resolution
//! - Receivables statistics and aging

pub mod claims;
pub mod error;
pub mod mileage;
pub mod models;
pub mod numbering;
pub mod payment;
pub mod pricing;
pub mod reporting;
pub mod service;

pub use claims::*;
pub use error::*;
pub use mileage::*;
pub use models::*;
pub use payment::*;
pub use pricing::*;
pub use reporting::*;
pub use service::*;
