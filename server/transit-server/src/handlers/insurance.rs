use crate::error::{api_success, ApiError, ApiResponse};
use crate::extract::{ApiJson, ApiPath};
use crate::server::TransitServer;
use crate::{validate_required, validate_uuid};
use axum::{
    extract::State,
    Json,
};
use insurance_service::{CoverageStatus, VerificationOutcome, VerificationRequest};
use uuid::Uuid;

fn validate_request(req: &VerificationRequest) -> Result<(), ApiError> {
    validate_uuid!(req.patient_id, "patient_id is required");
    validate_required!(req.insurance_company, "insurance_company is required");
    validate_required!(req.policy_number, "policy_number is required");
    Ok(())
}

/// Verify eligibility and record the patient's primary coverage
#[utoipa::path(
    post,
    path = "/api/insurance/verify",
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Eligibility result", body = VerificationOutcome),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Patient not found")
    ),
    tag = "insurance"
)]
pub async fn verify_insurance(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<VerificationRequest>,
) -> Result<Json<ApiResponse<VerificationOutcome>>, ApiError> {
    validate_request(&req)?;
    let outcome = server.insurance.verify(req, TransitServer::today()).await?;
    Ok(Json(api_success(outcome)))
}

/// Current primary coverage and whether it needs re-verification
#[utoipa::path(
    get,
    path = "/api/insurance/check/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Coverage on file", body = CoverageStatus),
        (status = 404, description = "No insurance on file")
    ),
    tag = "insurance"
)]
pub async fn check_insurance(
    State(server): State<TransitServer>,
    ApiPath(patient_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<CoverageStatus>>, ApiError> {
    let status = server.insurance.check(patient_id, TransitServer::today()).await?;
    Ok(Json(api_success(status)))
}
