//! HTTP handlers, one module per API area

pub mod analytics;
pub mod billing;
pub mod booking;
pub mod health;
pub mod insurance;
pub mod patient;
