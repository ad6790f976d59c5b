//! Portal authentication: signed bearer tokens for patients and staff

pub mod tokens;

pub use tokens::{TokenClaims, TokenService};
