//! Transit Server - non-emergency medical transportation API
//!
//! HTTP surface over the booking, insurance and billing services, plus the
//! analytics reports and the authenticated patient portal.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod portal;
pub mod routes;
pub mod server;
pub mod validation;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::*;
pub use server::TransitServer;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: TransitServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(from_fn_with_state(
                    server.clone(),
                    middleware::audit_logging_middleware,
                )),
        )
        .with_state(server)
}
