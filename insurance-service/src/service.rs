use crate::eligibility::{EligibilityCheck, StubEligibilityVerifier};
use crate::error::{InsuranceError, InsuranceResult};
use crate::models::{CoverageRecord, CoverageStatus, VerificationOutcome, VerificationRequest};
use chrono::NaiveDate;
use database_layer::{DatabasePool, TransactionManager};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const COVERAGE_COLUMNS: &str = "insurance_id, patient_id, insurance_company, policy_number, \
     group_number, effective_date, expiration_date, prior_authorization_required, \
     copay_amount, deductible_amount, status";

/// Insurance service
#[derive(Clone)]
pub struct InsuranceService {
    pool: DatabasePool,
    verifier: Arc<dyn EligibilityCheck>,
}

impl InsuranceService {
    /// Create a new insurance service with the offline verifier
    pub fn new(pool: DatabasePool) -> Self {
        Self::with_verifier(pool, Arc::new(StubEligibilityVerifier::new()))
    }

    pub fn with_verifier(pool: DatabasePool, verifier: Arc<dyn EligibilityCheck>) -> Self {
        Self { pool, verifier }
    }

    /// Verify eligibility and store the result as the patient's active
    /// primary coverage
    ///
    /// An existing active primary row is updated in place; otherwise a new
    /// one is inserted. Both happen in one transaction with the patient row
    /// locked so concurrent verifications for the same patient serialize.
    pub async fn verify(
        &self,
        request: VerificationRequest,
        today: NaiveDate,
    ) -> InsuranceResult<VerificationOutcome> {
        if request.insurance_company.trim().is_empty() {
            return Err(InsuranceError::Validation("insurance_company is required".into()));
        }
        if request.policy_number.trim().is_empty() {
            return Err(InsuranceError::Validation("policy_number is required".into()));
        }

        let eligibility = self.verifier.check(&request, today).await?;
        let status = if eligibility.active { "active" } else { "inactive" };

        let mut tx = TransactionManager::new(self.pool.clone()).begin().await?;

        let patient: Option<Uuid> = sqlx::query_scalar(
            "SELECT patient_id FROM medical.patients WHERE patient_id = $1 FOR UPDATE",
        )
        .bind(request.patient_id)
        .fetch_optional(&mut *tx)
        .await?;
        if patient.is_none() {
            return Err(InsuranceError::PatientNotFound(request.patient_id));
        }

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT insurance_id FROM medical.patient_insurance
            WHERE patient_id = $1 AND is_primary AND status = 'active'
            "#,
        )
        .bind(request.patient_id)
        .fetch_optional(&mut *tx)
        .await?;

        let insurance_id: Uuid = match existing {
            Some(insurance_id) => {
                sqlx::query_scalar(
                    r#"
                    UPDATE medical.patient_insurance
                    SET insurance_company = $2,
                        policy_number = $3,
                        group_number = $4,
                        effective_date = $5,
                        expiration_date = $6,
                        prior_authorization_required = $7,
                        copay_amount = $8,
                        deductible_amount = $9,
                        status = $10,
                        updated_at = NOW()
                    WHERE insurance_id = $1
                    RETURNING insurance_id
                    "#,
                )
                .bind(insurance_id)
                .bind(request.insurance_company.trim())
                .bind(request.policy_number.trim())
                .bind(&request.group_number)
                .bind(eligibility.coverage_dates.effective)
                .bind(eligibility.coverage_dates.expiration)
                .bind(eligibility.prior_auth_required)
                .bind(eligibility.copay)
                .bind(eligibility.deductible)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO medical.patient_insurance (
                        patient_id, insurance_company, policy_number, group_number,
                        effective_date, expiration_date, prior_authorization_required,
                        copay_amount, deductible_amount, is_primary, status
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)
                    RETURNING insurance_id
                    "#,
                )
                .bind(request.patient_id)
                .bind(request.insurance_company.trim())
                .bind(request.policy_number.trim())
                .bind(&request.group_number)
                .bind(eligibility.coverage_dates.effective)
                .bind(eligibility.coverage_dates.expiration)
                .bind(eligibility.prior_auth_required)
                .bind(eligibility.copay)
                .bind(eligibility.deductible)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        info!(
            patient_id = %request.patient_id,
            insurance_id = %insurance_id,
            payer_type = %eligibility.payer_type,
            updated = existing.is_some(),
            "Insurance verified"
        );

        Ok(VerificationOutcome {
            insurance_id,
            eligibility,
        })
    }

    /// Latest primary coverage for a patient
    pub async fn check(&self, patient_id: Uuid, today: NaiveDate) -> InsuranceResult<CoverageStatus> {
        let coverage = sqlx::query_as::<_, CoverageRecord>(&format!(
            "SELECT {COVERAGE_COLUMNS} FROM medical.patient_insurance \
             WHERE patient_id = $1 AND is_primary \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(patient_id)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(InsuranceError::NoCoverage(patient_id))?;

        Ok(CoverageStatus::evaluate(coverage, today))
    }
}
