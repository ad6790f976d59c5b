use crate::error::BillingResult;
use crate::models::ClaimStatus;
use crate::service::BillingService;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Claim totals for one status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct StatusSummary {
    pub claim_status: String,
    pub claim_count: i64,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
}

/// Receivable age, measured from the service date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AgingBucket {
    #[serde(rename = "0-30")]
    Current,
    #[serde(rename = "31-60")]
    Days31To60,
    #[serde(rename = "61-90")]
    Days61To90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 4] = [
        AgingBucket::Current,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    pub fn for_age(days: i32) -> Self {
        match days {
            i32::MIN..=30 => AgingBucket::Current,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgingTotal {
    pub bucket: AgingBucket,
    pub claim_count: i64,
    pub outstanding: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgingReport {
    pub buckets: Vec<AgingTotal>,
    pub total_outstanding: Decimal,
}

impl AgingReport {
    /// Fold `(age_days, outstanding)` pairs into the four buckets
    pub fn from_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (i32, Decimal)>,
    {
        let mut buckets: Vec<AgingTotal> = AgingBucket::ALL
            .iter()
            .map(|bucket| AgingTotal {
                bucket: *bucket,
                claim_count: 0,
                outstanding: Decimal::ZERO,
            })
            .collect();

        for (age_days, outstanding) in balances {
            let bucket = AgingBucket::for_age(age_days);
            if let Some(total) = buckets.iter_mut().find(|t| t.bucket == bucket) {
                total.claim_count += 1;
                total.outstanding += outstanding;
            }
        }

        let total_outstanding = buckets.iter().map(|t| t.outstanding).sum();
        Self {
            buckets,
            total_outstanding,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillingStats {
    pub by_status: Vec<StatusSummary>,
    pub aging: AgingReport,
}

impl BillingService {
    /// Totals by claim status and an aging report of open receivables
    pub async fn billing_stats(&self, today: NaiveDate) -> BillingResult<BillingStats> {
        let by_status = sqlx::query_as::<_, StatusSummary>(
            r#"
            SELECT claim_status,
                   COUNT(*) AS claim_count,
                   COALESCE(SUM(total_amount), 0) AS total_amount,
                   COALESCE(SUM(paid_amount), 0) AS paid_amount
            FROM billing.claims
            GROUP BY claim_status
            ORDER BY claim_status
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        let outstanding: Vec<&str> = ClaimStatus::OUTSTANDING.iter().map(|s| s.as_str()).collect();
        let balances: Vec<(i32, Decimal)> = sqlx::query_as(
            r#"
            SELECT ($2::date - service_date) AS age_days,
                   total_amount - paid_amount AS outstanding
            FROM billing.claims
            WHERE claim_status = ANY($1)
            "#,
        )
        .bind(outstanding)
        .bind(today)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(BillingStats {
            by_status,
            aging: AgingReport::from_balances(balances),
        })
    }
}
