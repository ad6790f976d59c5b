pub mod paths;

use crate::{
    handlers::{analytics, billing, booking, health, insurance, patient},
    openapi,
    server::TransitServer,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Health, version and API document routes
pub fn health_routes() -> Router<TransitServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
        .route(paths::health::OPENAPI_JSON, get(openapi::openapi_json))
}

/// Booking and dispatch routes
pub fn booking_routes() -> Router<TransitServer> {
    Router::new()
        .route(paths::booking::BOOK, post(booking::book_trip))
        .route(paths::booking::UNASSIGNED, get(booking::unassigned_trips))
        .route(paths::booking::TRIP_BY_ID, get(booking::get_trip))
        .route(paths::booking::ASSIGN, post(booking::assign_driver))
        .route(paths::booking::COMPLETE, post(booking::complete_trip))
        .route(paths::booking::CANCEL, post(booking::cancel_trip))
}

/// Insurance verification routes
pub fn insurance_routes() -> Router<TransitServer> {
    Router::new()
        .route(paths::insurance::VERIFY, post(insurance::verify_insurance))
        .route(paths::insurance::CHECK, get(insurance::check_insurance))
}

/// Claims and payments routes
pub fn billing_routes() -> Router<TransitServer> {
    Router::new()
        .route(paths::billing::GENERATE_CLAIM, post(billing::generate_claim))
        .route(paths::billing::CLAIM_BY_ID, get(billing::get_claim))
        .route(paths::billing::PENDING_CLAIMS, get(billing::pending_claims))
        .route(paths::billing::SUBMIT_CLAIM, post(billing::submit_claim))
        .route(paths::billing::POST_PAYMENT, post(billing::post_payment))
        .route(paths::billing::STATS, get(billing::billing_stats))
}

/// Reporting routes
pub fn analytics_routes() -> Router<TransitServer> {
    Router::new()
        .route(paths::analytics::DASHBOARD, get(analytics::dashboard))
        .route(paths::analytics::REVENUE, get(analytics::revenue))
        .route(paths::analytics::OPERATIONS, get(analytics::operations))
        .route(paths::analytics::PATIENTS, get(analytics::patients))
        .route(paths::analytics::SUMMARY, get(analytics::summary))
        .route(paths::analytics::REVENUE_TREND, get(analytics::revenue_trend))
        .route(paths::analytics::HEALTH, get(analytics::warehouse_health))
}

/// Patient portal routes (bearer token required except login and register)
pub fn patient_routes() -> Router<TransitServer> {
    Router::new()
        .route(paths::patient::LOGIN, post(patient::login))
        .route(paths::patient::REGISTER, post(patient::register))
        .route(
            paths::patient::PROFILE,
            get(patient::get_own_profile).put(patient::update_own_profile),
        )
        .route(
            paths::patient::PROFILE_BY_ID,
            get(patient::get_profile).put(patient::update_profile),
        )
        .route(paths::patient::TRIPS, get(patient::get_own_trips))
        .route(paths::patient::BOOK_TRIP, post(patient::book_trip))
        .route(paths::patient::TRIPS_BY_ID, get(patient::get_trips))
}

/// Create all application routes
pub fn create_routes() -> Router<TransitServer> {
    Router::new()
        .merge(health_routes())
        .merge(booking_routes())
        .merge(insurance_routes())
        .merge(billing_routes())
        .merge(analytics_routes())
        .merge(patient_routes())
}
