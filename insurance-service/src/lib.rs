//! Insurance Service for non-emergency medical transportation
//!
//! Provides insurance management capabilities including:
//! - Payer classification (Medi-Cal, Medicare, Commercial)
//! - Eligibility verification behind a pluggable check
//! - Coverage record upsert and re-verification checks

pub mod eligibility;
pub mod error;
pub mod models;
pub mod service;

pub use eligibility::*;
pub use error::*;
pub use models::*;
pub use service::*;
