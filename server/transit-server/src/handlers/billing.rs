use crate::error::{api_list, api_success, ApiError, ApiResponse};
use crate::extract::{ApiJson, ApiPath};
use crate::server::TransitServer;
use crate::{validate_required, validate_uuid};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use billing_service::{
    BillingStats, ClaimDetail, GenerateClaimRequest, GeneratedClaim, PaymentReceipt, PendingClaim,
    PostPaymentRequest, SubmitClaimRequest, SubmittedClaim,
};
use uuid::Uuid;

/// Generate a draft claim for a completed trip
#[utoipa::path(
    post,
    path = "/api/billing/generate-claim",
    request_body = GenerateClaimRequest,
    responses(
        (status = 201, description = "Claim generated", body = GeneratedClaim),
        (status = 400, description = "Trip not completed, no active insurance or no rate schedule"),
        (status = 404, description = "Trip not found"),
        (status = 409, description = "Claim already exists for this trip")
    ),
    tag = "billing"
)]
pub async fn generate_claim(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<GenerateClaimRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GeneratedClaim>>), ApiError> {
    validate_uuid!(req.trip_id, "trip_id is required");
    let claim = server.billing.generate_claim(req, TransitServer::today()).await?;
    Ok((StatusCode::CREATED, Json(api_success(claim))))
}

#[utoipa::path(
    get,
    path = "/api/billing/claim/{claim_id}",
    params(("claim_id" = Uuid, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim with line items", body = ClaimDetail),
        (status = 404, description = "Claim not found")
    ),
    tag = "billing"
)]
pub async fn get_claim(
    State(server): State<TransitServer>,
    ApiPath(claim_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ClaimDetail>>, ApiError> {
    Ok(Json(api_success(server.billing.get_claim(claim_id).await?)))
}

/// Draft and pending claims awaiting submission
#[utoipa::path(
    get,
    path = "/api/billing/pending-claims",
    responses((status = 200, description = "Claims awaiting submission", body = Vec<PendingClaim>)),
    tag = "billing"
)]
pub async fn pending_claims(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<Vec<PendingClaim>>>, ApiError> {
    Ok(Json(api_list(server.billing.pending_claims().await?)))
}

#[utoipa::path(
    post,
    path = "/api/billing/submit-claim",
    request_body = SubmitClaimRequest,
    responses(
        (status = 200, description = "Claim submitted", body = SubmittedClaim),
        (status = 400, description = "Claim is not awaiting submission"),
        (status = 404, description = "Claim not found")
    ),
    tag = "billing"
)]
pub async fn submit_claim(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<SubmitClaimRequest>,
) -> Result<Json<ApiResponse<SubmittedClaim>>, ApiError> {
    validate_uuid!(req.claim_id, "claim_id is required");
    Ok(Json(api_success(server.billing.submit_claim(req.claim_id).await?)))
}

/// Post a payer remittance against a submitted claim
#[utoipa::path(
    post,
    path = "/api/billing/post-payment",
    request_body = PostPaymentRequest,
    responses(
        (status = 201, description = "Payment posted", body = PaymentReceipt),
        (status = 400, description = "Invalid amount or claim not payable"),
        (status = 404, description = "Claim not found")
    ),
    tag = "billing"
)]
pub async fn post_payment(
    State(server): State<TransitServer>,
    ApiJson(req): ApiJson<PostPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentReceipt>>), ApiError> {
    validate_uuid!(req.claim_id, "claim_id is required");
    validate_required!(req.payer_name, "payer_name is required");
    let receipt = server.billing.post_payment(req, TransitServer::today()).await?;
    Ok((StatusCode::CREATED, Json(api_success(receipt))))
}

/// Claim totals by status and receivables aging
#[utoipa::path(
    get,
    path = "/api/billing/stats",
    responses((status = 200, description = "Billing statistics", body = BillingStats)),
    tag = "billing"
)]
pub async fn billing_stats(
    State(server): State<TransitServer>,
) -> Result<Json<ApiResponse<BillingStats>>, ApiError> {
    Ok(Json(api_success(server.billing.billing_stats(TransitServer::today()).await?)))
}
