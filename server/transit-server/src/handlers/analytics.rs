use crate::analytics::{
    self, Dashboard, DaysQuery, OperationsReport, PatientsReport, RevenuePoint, RevenueReport,
    Summary, WarehouseHealth,
};
use crate::error::{api_list, api_success, ApiError, ApiResponse};
use crate::extract::ApiQuery;
use crate::server::TransitServer;
use crate::validation::RequestValidation;
use axum::{extract::State, Json};

#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses((status = 200, description = "Live operational totals", body = Dashboard)),
    tag = "analytics"
)]
pub async fn dashboard(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let now = chrono::Local::now().time();
    let report = analytics::dashboard(server.db.pool(), TransitServer::today(), now).await?;
    Ok(Json(api_success(report)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/revenue",
    params(DaysQuery),
    responses(
        (status = 200, description = "Revenue by payer and day", body = RevenueReport),
        (status = 400, description = "days outside 1..=365")
    ),
    tag = "analytics"
)]
pub async fn revenue(
    State(server): State<TransitServer>,
    ApiQuery(query): ApiQuery<DaysQuery>,
) -> Result<Json<ApiResponse<RevenueReport>>, ApiError> {
    query.validate()?;
    let report = analytics::revenue(server.db.pool(), TransitServer::today(), query.days()).await?;
    Ok(Json(api_success(report)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/operations",
    params(DaysQuery),
    responses(
        (status = 200, description = "Trip volume, driver utilization and peak hours", body = OperationsReport),
        (status = 400, description = "days outside 1..=365")
    ),
    tag = "analytics"
)]
pub async fn operations(
    State(server): State<TransitServer>,
    ApiQuery(query): ApiQuery<DaysQuery>,
) -> Result<Json<ApiResponse<OperationsReport>>, ApiError> {
    query.validate()?;
    let report =
        analytics::operations(server.db.pool(), TransitServer::today(), query.days()).await?;
    Ok(Json(api_success(report)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/patients",
    responses((status = 200, description = "Patient population breakdown", body = PatientsReport)),
    tag = "analytics"
)]
pub async fn patients(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<PatientsReport>>, ApiError> {
    Ok(Json(api_success(analytics::patients(server.db.pool()).await?)))
}

/// Warehouse KPI cards, revenue trend and recent activity
#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    responses((status = 200, description = "Warehouse summary", body = Summary)),
    tag = "analytics"
)]
pub async fn summary(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<Summary>>, ApiError> {
    let report = analytics::summary(server.analytics_db.pool(), TransitServer::today()).await?;
    Ok(Json(api_success(report)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/revenue-trend",
    params(DaysQuery),
    responses(
        (status = 200, description = "Daily warehouse revenue", body = Vec<RevenuePoint>),
        (status = 400, description = "days outside 1..=365")
    ),
    tag = "analytics"
)]
pub async fn revenue_trend(
    State(server): State<TransitServer>,
    ApiQuery(query): ApiQuery<DaysQuery>,
) -> Result<Json<ApiResponse<Vec<RevenuePoint>>>, ApiError> {
    query.validate()?;
    let points =
        analytics::revenue_trend(server.analytics_db.pool(), TransitServer::today(), query.days())
            .await?;
    Ok(Json(api_list(points)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/health",
    responses(
        (status = 200, description = "Warehouse reachable", body = WarehouseHealth),
        (status = 503, description = "Warehouse unreachable")
    ),
    tag = "analytics"
)]
pub async fn warehouse_health(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<WarehouseHealth>>, ApiError> {
    let health = analytics::ping(server.analytics_db.pool()).await.map_err(|e| {
        tracing::warn!(error = %e, "Analytics warehouse health check failed");
        ApiError::service_unavailable("analytics warehouse is unreachable")
    })?;
    Ok(Json(api_success(health)))
}
