use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Booking endpoints
        crate::handlers::booking::book_trip,
        crate::handlers::booking::unassigned_trips,
        crate::handlers::booking::get_trip,
        crate::handlers::booking::assign_driver,
        crate::handlers::booking::complete_trip,
        crate::handlers::booking::cancel_trip,

        // Insurance endpoints
        crate::handlers::insurance::verify_insurance,
        crate::handlers::insurance::check_insurance,

        // Billing endpoints
        crate::handlers::billing::generate_claim,
        crate::handlers::billing::get_claim,
        crate::handlers::billing::pending_claims,
        crate::handlers::billing::submit_claim,
        crate::handlers::billing::post_payment,
        crate::handlers::billing::billing_stats,

        // Analytics endpoints
        crate::handlers::analytics::dashboard,
        crate::handlers::analytics::revenue,
        crate::handlers::analytics::operations,
        crate::handlers::analytics::patients,
        crate::handlers::analytics::summary,
        crate::handlers::analytics::revenue_trend,
        crate::handlers::analytics::warehouse_health,

        // Patient portal endpoints
        crate::handlers::patient::login,
        crate::handlers::patient::register,
        crate::handlers::patient::get_own_profile,
        crate::handlers::patient::get_profile,
        crate::handlers::patient::update_own_profile,
        crate::handlers::patient::update_profile,
        crate::handlers::patient::get_own_trips,
        crate::handlers::patient::get_trips,
        crate::handlers::patient::book_trip,
    ),
    components(
        schemas(crate::error::ApiErrorResponse)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "System health and version"),
        (name = "booking", description = "Trip booking and dispatch"),
        (name = "insurance", description = "Eligibility verification and coverage"),
        (name = "billing", description = "Claims, payments and receivables"),
        (name = "analytics", description = "Operational and warehouse reporting"),
        (name = "patient", description = "Patient portal"),
    ),
    info(
        title = "Transit Engine API",
        description = "Non-emergency medical transportation: booking, insurance verification, billing, analytics and the patient portal.",
    ),
)]
pub struct ApiDoc;

/// Registers the bearer token scheme used by the patient portal
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
