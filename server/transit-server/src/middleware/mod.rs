//! Middleware for request processing

pub mod auth_context;

pub use auth_context::AuthContext;

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Request timing middleware
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        duration_ms = start.elapsed().as_millis(),
        status = response.status().as_u16(),
        "Request processed"
    );

    response
}

/// Audit logging middleware
///
/// Records who called what. The bearer token itself is never logged, only
/// the subject of a token that verifies; query strings are dropped because
/// they can carry identifiers.
pub async fn audit_logging_middleware(
    axum::extract::State(server): axum::extract::State<crate::TransitServer>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let actor = audit_actor(&server, &headers);

    tracing::info!(
        method = %method,
        path = %path,
        actor = %actor,
        "Audit log: Request received"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        actor = %actor,
        status = response.status().as_u16(),
        "Audit log: Response sent"
    );

    response
}

fn audit_actor(server: &crate::TransitServer, headers: &HeaderMap) -> String {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) else {
        return "anonymous".to_string();
    };
    value
        .strip_prefix("Bearer ")
        .and_then(|token| server.tokens.verify(token).ok())
        .map_or_else(
            || "unverified".to_string(),
            |claims| format!("{}:{}", claims.role, claims.sub),
        )
}
