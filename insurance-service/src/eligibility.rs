use crate::error::InsuranceResult;
use crate::models::{CoverageDates, EligibilityResult, PayerType, VerificationRequest};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

/// Eligibility lookup against a payer or clearinghouse
#[async_trait]
pub trait EligibilityCheck: Send + Sync {
    async fn check(
        &self,
        request: &VerificationRequest,
        today: NaiveDate,
    ) -> InsuranceResult<EligibilityResult>;
}

/// Offline verifier: every policy is reported verified and active with the
/// benefit defaults of its payer type.
#[derive(Debug, Clone, Default)]
pub struct StubEligibilityVerifier;

impl StubEligibilityVerifier {
    /// Create a new eligibility verifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EligibilityCheck for StubEligibilityVerifier {
    async fn check(
        &self,
        request: &VerificationRequest,
        today: NaiveDate,
    ) -> InsuranceResult<EligibilityResult> {
        let payer_type = PayerType::classify(&request.insurance_company);
        let defaults = payer_type.defaults();

        tracing::debug!(
            payer_type = %payer_type,
            policy = %logger_redacted::mask_identifier(&request.policy_number),
            "Stub eligibility check"
        );

        Ok(EligibilityResult {
            payer_type,
            verified: true,
            active: true,
            message: defaults.message.to_string(),
            prior_auth_required: defaults.prior_auth_required,
            copay: defaults.copay,
            deductible: defaults.deductible,
            coverage_dates: CoverageDates::starting_year_of(today),
            checked_at: Utc::now(),
        })
    }
}
