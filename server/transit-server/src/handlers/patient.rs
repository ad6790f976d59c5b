use crate::auth::tokens::IssuedToken;
use crate::error::{api_success, ApiError, ApiResponse};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthContext;
use crate::portal::{self, PatientProfile, ProfileUpdate};
use crate::server::TransitServer;
use crate::validate_required;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use booking_service::{BookingOutcome, PatientTrips, RegisteredPatient, RegistrationRequest, TripRequest};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Exchange portal credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/patient/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = IssuedToken),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "patient"
)]
pub async fn login(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    validate_required!(req.username, "username is required");
    validate_required!(req.password, "password is required");

    let account = server.booking.authenticate(req.username.trim(), &req.password).await?;
    let token = server.tokens.issue(&account).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign portal token");
        ApiError::internal("could not issue token")
    })?;

    tracing::info!(user_id = %account.user_id, role = %account.role, "Portal login");
    Ok(Json(api_success(token)))
}

/// Create a portal account and patient record
#[utoipa::path(
    post,
    path = "/api/patient/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registered; temporary credentials returned once", body = RegisteredPatient),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Phone number already registered")
    ),
    tag = "patient"
)]
pub async fn register(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredPatient>>), ApiError> {
    let registered = server
        .booking
        .register_patient(req, TransitServer::today())
        .await?;
    Ok((StatusCode::CREATED, Json(api_success(registered))))
}

#[utoipa::path(
    get,
    path = "/api/patient/profile",
    responses(
        (status = 200, description = "Own profile", body = PatientProfile),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn get_own_profile(
    State(server): State<TransitServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<PatientProfile>>, ApiError> {
    profile_for(&server, &auth, None).await
}

#[utoipa::path(
    get,
    path = "/api/patient/profile/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient profile", body = PatientProfile),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not this patient's record"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(server): State<TransitServer>,
    ApiPath(patient_id): ApiPath<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<PatientProfile>>, ApiError> {
    profile_for(&server, &auth, Some(patient_id)).await
}

async fn profile_for(
    server: &TransitServer,
    auth: &AuthContext,
    target: Option<Uuid>,
) -> Result<Json<ApiResponse<PatientProfile>>, ApiError> {
    let patient_id = auth.authorize_patient(target)?;
    let profile = portal::load_profile(server.db.pool(), patient_id).await?;
    Ok(Json(api_success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/patient/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = PatientProfile),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Phone number already registered")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn update_own_profile(
    State(server): State<TransitServer>,
    auth: AuthContext,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<ApiResponse<PatientProfile>>, ApiError> {
    let patient_id = auth.authorize_patient(None)?;
    let profile = portal::update_profile(server.db.pool(), patient_id, update).await?;
    Ok(Json(api_success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/patient/profile/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = PatientProfile),
        (status = 403, description = "Not this patient's record"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(server): State<TransitServer>,
    ApiPath(patient_id): ApiPath<Uuid>,
    auth: AuthContext,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<ApiResponse<PatientProfile>>, ApiError> {
    let patient_id = auth.authorize_patient(Some(patient_id))?;
    let profile = portal::update_profile(server.db.pool(), patient_id, update).await?;
    Ok(Json(api_success(profile)))
}

#[utoipa::path(
    get,
    path = "/api/patient/trips",
    responses(
        (status = 200, description = "Upcoming trips and history", body = PatientTrips),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn get_own_trips(
    State(server): State<TransitServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<PatientTrips>>, ApiError> {
    trips_for(&server, &auth, None).await
}

#[utoipa::path(
    get,
    path = "/api/patient/trips/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Upcoming trips and history", body = PatientTrips),
        (status = 403, description = "Not this patient's record")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn get_trips(
    State(server): State<TransitServer>,
    ApiPath(patient_id): ApiPath<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<PatientTrips>>, ApiError> {
    trips_for(&server, &auth, Some(patient_id)).await
}

async fn trips_for(
    server: &TransitServer,
    auth: &AuthContext,
    target: Option<Uuid>,
) -> Result<Json<ApiResponse<PatientTrips>>, ApiError> {
    let patient_id = auth.authorize_patient(target)?;
    let trips = server.booking.patient_trips(patient_id).await?;
    Ok(Json(api_success(PatientTrips::partition(trips, TransitServer::today()))))
}

/// Book a trip for the signed-in patient
#[utoipa::path(
    post,
    path = "/api/patient/trips/book",
    request_body = TripRequest,
    responses(
        (status = 201, description = "Trip booked", body = BookingOutcome),
        (status = 400, description = "Missing fields or time outside business hours"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "patient",
    security(("bearer_auth" = []))
)]
pub async fn book_trip(
    State(server): State<TransitServer>,
    auth: AuthContext,
    ApiJson(req): ApiJson<TripRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingOutcome>>), ApiError> {
    let patient_id = auth.authorize_patient(None)?;
    let outcome = server
        .booking
        .book_for_patient(patient_id, req, TransitServer::today())
        .await?;
    Ok((StatusCode::CREATED, Json(api_success(outcome))))
}
