//! Booking Service for non-emergency medical transportation
//!
//! Provides booking and dispatch capabilities including:
//! - Business-hours validation of requested appointment and pickup times
//! - Patient find-or-create by phone, with generated portal credentials
//! - Trip creation and best-effort driver matching by shift window
//! - Manual dispatch, completion and cancellation of trips

pub mod accounts;
pub mod credentials;
pub mod error;
pub mod hours;
pub mod identifiers;
pub mod matching;
pub mod models;
pub mod service;

pub use accounts::*;
pub use error::*;
pub use hours::*;
pub use matching::*;
pub use models::*;
pub use service::*;
