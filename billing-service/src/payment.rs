use crate::error::{BillingError, BillingResult};
use crate::models::{ClaimStatus, PaymentReceipt, PostPaymentRequest};
use crate::numbering::{document_number, MAX_ATTEMPTS, PAYMENT_PREFIX};
use crate::pricing::{round_cents, MAX_AMOUNT};
use crate::service::{parse_status, record_transition, BillingService};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// Claim balance after applying a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: ClaimStatus,
}

/// Paid once the cumulative amount reaches the claim total, otherwise
/// partially paid. Overpayment leaves a zero balance.
pub fn settle(
    total_amount: Decimal,
    already_paid: Decimal,
    payment: Decimal,
) -> BillingResult<Settlement> {
    let total_paid = already_paid
        .checked_add(payment)
        .filter(|paid| *paid <= MAX_AMOUNT)
        .ok_or_else(|| {
            BillingError::Validation("cumulative payments exceed the largest recordable amount".into())
        })?;
    let status = if total_paid >= total_amount {
        ClaimStatus::Paid
    } else {
        ClaimStatus::PartiallyPaid
    };
    Ok(Settlement {
        total_paid,
        balance: total_amount
            .checked_sub(total_paid)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO),
        status,
    })
}

/// Posted amount rounded to the cent, within `0 < amount <= MAX_AMOUNT`
pub fn validate_payment_amount(amount: Decimal) -> BillingResult<Decimal> {
    let amount = round_cents(amount);
    if amount <= Decimal::ZERO {
        return Err(BillingError::Validation("payment_amount must be greater than zero".into()));
    }
    if amount > MAX_AMOUNT {
        return Err(BillingError::Validation(format!(
            "payment_amount must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

impl BillingService {
    /// Record a remittance against a submitted or partially paid claim
    pub async fn post_payment(
        &self,
        request: PostPaymentRequest,
        today: NaiveDate,
    ) -> BillingResult<PaymentReceipt> {
        let amount = validate_payment_amount(request.payment_amount)?;
        if request.payer_name.trim().is_empty() {
            return Err(BillingError::Validation("payer_name is required".into()));
        }

        let mut tx = self.transactions.begin().await?;

        let (raw_status, total_amount, paid_amount): (String, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT claim_status, total_amount, paid_amount
            FROM billing.claims
            WHERE claim_id = $1
            FOR UPDATE
            "#,
        )
        .bind(request.claim_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BillingError::ClaimNotFound(request.claim_id))?;

        let previous_status = parse_status(&raw_status)?;
        if !previous_status.accepts_payment() {
            return Err(BillingError::InvalidTransition {
                from: previous_status,
                action: "post a payment",
            });
        }

        let settlement = settle(total_amount, paid_amount, amount)?;
        let method = request.payment_method.unwrap_or_default();

        let mut inserted = None;
        for _ in 0..MAX_ATTEMPTS {
            let payment_number = document_number(PAYMENT_PREFIX, today);
            let payment_id: Option<Uuid> = sqlx::query_scalar(
                r#"
                INSERT INTO billing.payments (
                    claim_id, payment_number, payment_date, payment_amount, payment_method,
                    check_number, payer_name, reference_number, notes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (payment_number) DO NOTHING
                RETURNING payment_id
                "#,
            )
            .bind(request.claim_id)
            .bind(&payment_number)
            .bind(request.payment_date)
            .bind(amount)
            .bind(method.as_str())
            .bind(&request.check_number)
            .bind(request.payer_name.trim())
            .bind(&request.reference_number)
            .bind(&request.notes)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(payment_id) = payment_id {
                inserted = Some((payment_id, payment_number));
                break;
            }
        }
        let (payment_id, payment_number) =
            inserted.ok_or(BillingError::NumberExhausted("payment"))?;

        sqlx::query(
            r#"
            UPDATE billing.claims
            SET paid_amount = $2, claim_status = $3, payment_date = $4, updated_at = NOW()
            WHERE claim_id = $1
            "#,
        )
        .bind(request.claim_id)
        .bind(settlement.total_paid)
        .bind(settlement.status.as_str())
        .bind(request.payment_date)
        .execute(&mut *tx)
        .await?;

        record_transition(
            &mut tx,
            request.claim_id,
            Some(previous_status),
            settlement.status,
            &format!("Payment posted: ${amount} ({payment_number})"),
        )
        .await?;

        tx.commit().await?;

        info!(
            claim_id = %request.claim_id,
            payment_number = %payment_number,
            amount = %amount,
            status = %settlement.status,
            "Payment posted"
        );

        Ok(PaymentReceipt {
            payment_id,
            payment_number,
            claim_id: request.claim_id,
            previous_status,
            claim_status: settlement.status,
            payment_amount: amount,
            total_paid: settlement.total_paid,
            balance: settlement.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn exact_payment_marks_paid() {
        let s = settle(dollars(7000), Decimal::ZERO, dollars(7000)).unwrap();
        assert_eq!(s.status, ClaimStatus::Paid);
        assert_eq!(s.balance, Decimal::ZERO);
    }

    #[test]
    fn short_payment_is_partial() {
        let s = settle(dollars(7000), Decimal::ZERO, dollars(4000)).unwrap();
        assert_eq!(s.status, ClaimStatus::PartiallyPaid);
        assert_eq!(s.balance, dollars(3000));
    }

    #[test]
    fn cumulative_payments_settle_the_claim() {
        let first = settle(dollars(7000), Decimal::ZERO, dollars(4000)).unwrap();
        let second = settle(dollars(7000), first.total_paid, dollars(3000)).unwrap();
        assert_eq!(second.status, ClaimStatus::Paid);
        assert_eq!(second.total_paid, dollars(7000));
    }

    #[test]
    fn overpayment_leaves_zero_balance() {
        let s = settle(dollars(7000), dollars(5000), dollars(2500)).unwrap();
        assert_eq!(s.status, ClaimStatus::Paid);
        assert_eq!(s.balance, Decimal::ZERO);
        assert_eq!(s.total_paid, dollars(7500));
    }

    #[test]
    fn payment_at_limit_is_accepted() {
        assert_eq!(validate_payment_amount(MAX_AMOUNT).unwrap(), MAX_AMOUNT);
        let s = settle(MAX_AMOUNT, Decimal::ZERO, MAX_AMOUNT).unwrap();
        assert_eq!(s.status, ClaimStatus::Paid);
    }

    #[test]
    fn payment_over_limit_is_rejected() {
        for amount in [MAX_AMOUNT + dollars(1), Decimal::MAX] {
            let err = validate_payment_amount(amount).unwrap_err();
            assert!(matches!(err, BillingError::Validation(_)));
        }
        assert!(validate_payment_amount(Decimal::ZERO).is_err());
    }

    #[test]
    fn cumulative_overflow_is_rejected() {
        let err = settle(dollars(7000), MAX_AMOUNT, dollars(1)).unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
        assert!(settle(dollars(7000), Decimal::MAX, Decimal::MAX).is_err());
    }
}
