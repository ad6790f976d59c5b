use crate::error::{api_success, ApiResponse};
use crate::server::TransitServer;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2026-01-15T10:30:00Z")]
    pub timestamp: String,
    /// API version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Individual dependency checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    #[schema(example = "Transit Engine")]
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Enabled API modules
    pub features: Vec<String>,
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(server): State<TransitServer>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database_ok = server.db.is_healthy().await;

    let mut checks = HashMap::new();
    checks.insert(
        "database".to_string(),
        if database_ok { "healthy" } else { "unhealthy" }.to_string(),
    );

    let (status, label) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: label.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    (status, Json(api_success(response)))
}

/// Version information handler
#[utoipa::path(
    get,
    path = "/version",
    tag = "health",
    responses(
        (status = 200, description = "Version information", body = VersionResponse)
    )
)]
pub async fn version_info(State(server): State<TransitServer>) -> Json<ApiResponse<VersionResponse>> {
    let features = ["booking", "insurance", "billing", "analytics", "patient-portal"]
        .iter()
        .map(|f| (*f).to_string())
        .collect();

    Json(api_success(VersionResponse {
        name: server.config.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features,
    }))
}
