use crate::error::{api_list, api_success, ApiError, ApiResponse};
use crate::extract::{ApiJson, ApiPath};
use crate::server::TransitServer;
use crate::validate_uuid;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use booking_service::{AssignDriverRequest, BookingOutcome, BookingRequest, Trip, TripTransition};
use uuid::Uuid;

/// Book a trip, registering the patient when the phone number is new
#[utoipa::path(
    post,
    path = "/api/booking/book",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Trip booked", body = BookingOutcome),
        (status = 400, description = "Missing fields or time outside business hours"),
        (status = 500, description = "Internal server error")
    ),
    tag = "booking"
)]
pub async fn book_trip(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingOutcome>>), ApiError> {
    let outcome = server.booking.book(req, TransitServer::today()).await?;
    Ok((StatusCode::CREATED, Json(api_success(outcome))))
}

/// Scheduled trips still waiting for a driver, earliest pickup first
#[utoipa::path(
    get,
    path = "/api/booking/trips/unassigned",
    responses(
        (status = 200, description = "Dispatch queue", body = Vec<Trip>)
    ),
    tag = "booking"
)]
pub async fn unassigned_trips(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<Vec<Trip>>>, ApiError> {
    let trips = server.booking.unassigned_trips().await?;
    Ok(Json(api_list(trips)))
}

#[utoipa::path(
    get,
    path = "/api/booking/trips/{trip_id}",
    params(("trip_id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip", body = Trip),
        (status = 404, description = "Trip not found")
    ),
    tag = "booking"
)]
pub async fn get_trip(
    State(server): State<TransitServer>,
    ApiPath(trip_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Trip>>, ApiError> {
    Ok(Json(api_success(server.booking.get_trip(trip_id).await?)))
}

/// Manually dispatch a driver to a scheduled trip
#[utoipa::path(
    post,
    path = "/api/booking/trips/{trip_id}/assign",
    params(("trip_id" = Uuid, Path, description = "Trip ID")),
    request_body = AssignDriverRequest,
    responses(
        (status = 200, description = "Driver assigned", body = TripTransition),
        (status = 400, description = "Driver unavailable or trip not scheduled"),
        (status = 404, description = "Trip or driver not found")
    ),
    tag = "booking"
)]
pub async fn assign_driver(
    State(server): State<TransitServer>,
    ApiPath(trip_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssignDriverRequest>,
) -> Result<Json<ApiResponse<TripTransition>>, ApiError> {
    validate_uuid!(req.driver_id, "driver_id is required");
    let transition = server.booking.assign_driver(trip_id, req.driver_id).await?;
    Ok(Json(api_success(transition)))
}

#[utoipa::path(
    post,
    path = "/api/booking/trips/{trip_id}/complete",
    params(("trip_id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip completed and driver released", body = TripTransition),
        (status = 400, description = "Trip is not assigned"),
        (status = 404, description = "Trip not found")
    ),
    tag = "booking"
)]
pub async fn complete_trip(
    State(server): State<TransitServer>,
    ApiPath(trip_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<TripTransition>>, ApiError> {
    Ok(Json(api_success(server.booking.complete_trip(trip_id).await?)))
}

#[utoipa::path(
    post,
    path = "/api/booking/trips/{trip_id}/cancel",
    params(("trip_id" = Uuid, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip cancelled and driver released", body = TripTransition),
        (status = 400, description = "Trip is already closed"),
        (status = 404, description = "Trip not found")
    ),
    tag = "booking"
)]
pub async fn cancel_trip(
    State(server): State<TransitServer>,
    ApiPath(trip_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<TripTransition>>, ApiError> {
    Ok(Json(api_success(server.booking.cancel_trip(trip_id).await?)))
}
