use crate::error::{BillingError, BillingResult};
use crate::models::{
    Claim, ClaimDetail, ClaimLineItem, ClaimStatus, GenerateClaimRequest, GeneratedClaim,
    PendingClaim, RateSchedule, ServiceType, SubmittedClaim, MILEAGE_CODE,
};
use crate::numbering::{document_number, CLAIM_PREFIX, MAX_ATTEMPTS};
use crate::pricing::{validate_mileage, ClaimPricing};
use crate::service::{parse_status, record_transition, BillingService};
use chrono::{DateTime, NaiveDate, Utc};
use insurance_service::PayerType;
use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

/// Trip joined with the patient's active primary coverage
#[derive(Debug, FromRow)]
struct BillableTrip {
    patient_id: Uuid,
    status: String,
    trip_date: NaiveDate,
    pickup_address: String,
    dropoff_address: String,
    insurance_id: Option<Uuid>,
    insurance_company: Option<String>,
    copay_amount: Option<Decimal>,
}

const CLAIM_SELECT: &str = r#"
    SELECT c.claim_id, c.claim_number, c.trip_id, t.trip_number, c.patient_id,
           p.first_name || ' ' || p.last_name AS patient_name,
           pi.insurance_company, pi.policy_number,
           c.payer_type, c.service_type, c.service_date, c.claim_status,
           c.total_amount, c.approved_amount, c.paid_amount, c.patient_responsibility,
           c.submission_date, c.payment_date, c.denial_reason, c.payer_claim_number,
           c.created_at
    FROM billing.claims c
    INNER JOIN medical.patients p ON c.patient_id = p.patient_id
    INNER JOIN medical.patient_insurance pi ON c.insurance_id = pi.insurance_id
    INNER JOIN operations.trips t ON c.trip_id = t.trip_id
"#;

impl BillingService {
    /// Generate a draft claim from a completed trip
    ///
    /// The trip row stays locked for the whole transaction, so two
    /// concurrent requests for the same trip cannot both pass the
    /// duplicate check.
    pub async fn generate_claim(
        &self,
        request: GenerateClaimRequest,
        today: NaiveDate,
    ) -> BillingResult<GeneratedClaim> {
        if let Some(mileage) = request.mileage {
            validate_mileage(mileage)?;
        }
        let service_type = request.service_type.unwrap_or_default();

        let mut tx = self.transactions.begin().await?;

        let trip = sqlx::query_as::<_, BillableTrip>(
            r#"
            SELECT t.patient_id, t.status, t.trip_date, t.pickup_address, t.dropoff_address,
                   pi.insurance_id, pi.insurance_company, pi.copay_amount
            FROM operations.trips t
            LEFT JOIN medical.patient_insurance pi
                   ON pi.patient_id = t.patient_id AND pi.is_primary AND pi.status = 'active'
            WHERE t.trip_id = $1
            FOR UPDATE OF t
            "#,
        )
        .bind(request.trip_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BillingError::TripNotFound(request.trip_id))?;

        if trip.status != "completed" {
            return Err(BillingError::TripNotCompleted(request.trip_id));
        }
        let (Some(insurance_id), Some(insurance_company)) =
            (trip.insurance_id, trip.insurance_company.clone())
        else {
            return Err(BillingError::NoActiveInsurance);
        };

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT claim_id FROM billing.claims WHERE trip_id = $1")
                .bind(request.trip_id)
                .fetch_optional(&mut *tx)
                .await?;
        if let Some(claim_id) = existing {
            return Err(BillingError::DuplicateClaim { claim_id });
        }

        let payer_type = PayerType::classify(&insurance_company);
        let service_date = trip.trip_date;

        let rates = sqlx::query_as::<_, RateSchedule>(
            r#"
            SELECT rate_id, payer_type, service_type, base_rate, per_mile_rate,
                   wait_time_rate, after_hours_surcharge, weekend_surcharge
            FROM billing.rate_schedules
            WHERE payer_type = $1
              AND service_type = $2
              AND is_active
              AND effective_date <= $3
              AND (expiration_date IS NULL OR expiration_date >= $3)
            ORDER BY effective_date DESC
            LIMIT 1
            "#,
        )
        .bind(payer_type.as_str())
        .bind(service_type.as_str())
        .bind(service_date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BillingError::NoRateSchedule {
            payer_type: payer_type.as_str().to_string(),
            service_type: service_type.as_str().to_string(),
        })?;

        let mileage = request
            .mileage
            .unwrap_or_else(|| self.mileage.estimate(&trip.pickup_address, &trip.dropoff_address));
        let pricing = ClaimPricing::compute(&rates, mileage, service_date)?;
        let copay = trip.copay_amount.unwrap_or(Decimal::ZERO);

        let mut inserted = None;
        for _ in 0..MAX_ATTEMPTS {
            let claim_number = document_number(CLAIM_PREFIX, today);
            let claim_id: Option<Uuid> = sqlx::query_scalar(
                r#"
                INSERT INTO billing.claims (
                    claim_number, trip_id, patient_id, insurance_id, payer_type, service_type,
                    service_date, claim_status, total_amount, patient_responsibility
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (claim_number) DO NOTHING
                RETURNING claim_id
                "#,
            )
            .bind(&claim_number)
            .bind(request.trip_id)
            .bind(trip.patient_id)
            .bind(insurance_id)
            .bind(payer_type.as_str())
            .bind(service_type.as_str())
            .bind(service_date)
            .bind(ClaimStatus::Draft.as_str())
            .bind(pricing.total)
            .bind(copay)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(claim_id) = claim_id {
                inserted = Some((claim_id, claim_number));
                break;
            }
        }
        let (claim_id, claim_number) = inserted.ok_or(BillingError::NumberExhausted("claim"))?;

        insert_line_items(&mut tx, claim_id, service_type, &pricing).await?;
        record_transition(
            &mut tx,
            claim_id,
            None,
            ClaimStatus::Draft,
            "Claim auto-generated from completed trip",
        )
        .await?;

        tx.commit().await?;

        info!(
            claim_id = %claim_id,
            claim_number = %claim_number,
            trip_id = %request.trip_id,
            payer_type = %payer_type,
            total = %pricing.total,
            "Claim generated"
        );

        Ok(GeneratedClaim {
            claim_id,
            claim_number,
            claim_status: ClaimStatus::Draft,
            total_amount: pricing.total,
            breakdown: pricing.breakdown(copay),
            payer_type,
            service_type,
            insurance_company,
            service_date,
        })
    }

    /// Claim header and its line items
    pub async fn get_claim(&self, claim_id: Uuid) -> BillingResult<ClaimDetail> {
        let claim = sqlx::query_as::<_, Claim>(&format!("{CLAIM_SELECT} WHERE c.claim_id = $1"))
            .bind(claim_id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(BillingError::ClaimNotFound(claim_id))?;

        let line_items = sqlx::query_as::<_, ClaimLineItem>(
            r#"
            SELECT line_number, service_code, service_description, quantity, unit_price, line_total
            FROM billing.claim_line_items
            WHERE claim_id = $1
            ORDER BY line_number
            "#,
        )
        .bind(claim_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(ClaimDetail { claim, line_items })
    }

    /// Claims awaiting submission, newest service date first
    pub async fn pending_claims(&self) -> BillingResult<Vec<PendingClaim>> {
        let statuses: Vec<&str> = ClaimStatus::AWAITING_SUBMISSION
            .iter()
            .map(|s| s.as_str())
            .collect();

        let claims = sqlx::query_as::<_, PendingClaim>(
            r#"
            SELECT c.claim_id, c.claim_number, c.service_date, c.total_amount, c.claim_status,
                   p.first_name || ' ' || p.last_name AS patient_name,
                   pi.insurance_company, t.trip_number
            FROM billing.claims c
            INNER JOIN medical.patients p ON c.patient_id = p.patient_id
            INNER JOIN medical.patient_insurance pi ON c.insurance_id = pi.insurance_id
            INNER JOIN operations.trips t ON c.trip_id = t.trip_id
            WHERE c.claim_status = ANY($1)
            ORDER BY c.service_date DESC
            "#,
        )
        .bind(statuses)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(claims)
    }

    /// Move a draft claim to submitted
    pub async fn submit_claim(&self, claim_id: Uuid) -> BillingResult<SubmittedClaim> {
        let mut tx = self.transactions.begin().await?;

        let (raw_status, claim_number): (String, String) = sqlx::query_as(
            "SELECT claim_status, claim_number FROM billing.claims WHERE claim_id = $1 FOR UPDATE",
        )
        .bind(claim_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BillingError::ClaimNotFound(claim_id))?;

        let from = parse_status(&raw_status)?;
        if !from.can_submit() {
            return Err(BillingError::InvalidTransition {
                from,
                action: "submit",
            });
        }

        let submission_date: DateTime<Utc> = sqlx::query_scalar(
            r#"
            UPDATE billing.claims
            SET claim_status = $2, submission_date = NOW(), updated_at = NOW()
            WHERE claim_id = $1
            RETURNING submission_date
            "#,
        )
        .bind(claim_id)
        .bind(ClaimStatus::Submitted.as_str())
        .fetch_one(&mut *tx)
        .await?;

        record_transition(
            &mut tx,
            claim_id,
            Some(from),
            ClaimStatus::Submitted,
            "Claim submitted to clearinghouse",
        )
        .await?;

        tx.commit().await?;

        info!(claim_id = %claim_id, claim_number = %claim_number, "Claim submitted");

        Ok(SubmittedClaim {
            claim_id,
            claim_number,
            claim_status: ClaimStatus::Submitted,
            submission_date,
        })
    }
}

async fn insert_line_items(
    conn: &mut sqlx::PgConnection,
    claim_id: Uuid,
    service_type: ServiceType,
    pricing: &ClaimPricing,
) -> BillingResult<()> {
    let lines = [
        (
            1_i32,
            service_type.base_code(),
            service_type.base_description(),
            Decimal::ONE,
            pricing.base_charge,
            pricing.base_charge,
        ),
        (
            2_i32,
            MILEAGE_CODE,
            "Mileage",
            pricing.mileage,
            pricing.per_mile_rate,
            pricing.mileage_charge,
        ),
    ];

    for (line_number, code, description, quantity, unit_price, line_total) in lines {
        sqlx::query(
            r#"
            INSERT INTO billing.claim_line_items (
                claim_id, line_number, service_code, service_description,
                quantity, unit_price, line_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(claim_id)
        .bind(line_number)
        .bind(code)
        .bind(description)
        .bind(quantity)
        .bind(unit_price)
        .bind(line_total)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
