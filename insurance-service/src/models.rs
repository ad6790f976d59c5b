use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Payer category that drives eligibility defaults and rate schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PayerType {
    MediCal,
    Medicare,
    Commercial,
}

/// Case-insensitive substring patterns, checked in order. Anything that
/// matches none of them is a commercial payer.
const PAYER_PATTERNS: &[(&str, PayerType)] = &[
    ("medi-cal", PayerType::MediCal),
    ("medicaid", PayerType::MediCal),
    ("medicare", PayerType::Medicare),
];

impl PayerType {
    /// Classify an insurance company name
    pub fn classify(insurance_company: &str) -> Self {
        let lower = insurance_company.to_lowercase();
        PAYER_PATTERNS
            .iter()
            .find(|(pattern, _)| lower.contains(pattern))
            .map_or(PayerType::Commercial, |(_, payer)| *payer)
    }

    /// Stored form, as used by `billing.rate_schedules.payer_type`
    pub fn as_str(self) -> &'static str {
        match self {
            PayerType::MediCal => "medi-cal",
            PayerType::Medicare => "medicare",
            PayerType::Commercial => "commercial",
        }
    }

    /// Display label used in analytics breakdowns
    pub fn label(self) -> &'static str {
        match self {
            PayerType::MediCal => "Medi-Cal",
            PayerType::Medicare => "Medicare",
            PayerType::Commercial => "Commercial",
        }
    }

    /// SQL `CASE` expression classifying `column` into payer labels
    ///
    /// Generated from the same pattern table as [`PayerType::classify`] so
    /// aggregate queries and claim generation always agree.
    pub fn sql_label_case(column: &str) -> String {
        let mut sql = String::from("CASE");
        for (pattern, payer) in PAYER_PATTERNS {
            sql.push_str(&format!(
                " WHEN LOWER({column}) LIKE '%{pattern}%' THEN '{}'",
                payer.label()
            ));
        }
        sql.push_str(&format!(" ELSE '{}' END", PayerType::Commercial.label()));
        sql
    }

    /// Benefit defaults returned by the eligibility check
    pub fn defaults(self) -> PayerDefaults {
        match self {
            PayerType::MediCal => PayerDefaults {
                copay: Decimal::ZERO,
                deductible: Decimal::ZERO,
                prior_auth_required: false,
                message: "Medi-Cal coverage verified",
            },
            // Only Medi-Cal has its own eligibility profile; Medicare is
            // priced separately but verifies like any other payer.
            PayerType::Medicare | PayerType::Commercial => PayerDefaults {
                copay: Decimal::new(1500, 2),
                deductible: Decimal::new(25000, 2),
                prior_auth_required: true,
                message: "Coverage verified - prior authorization may be required",
            },
        }
    }
}

impl std::fmt::Display for PayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerDefaults {
    pub copay: Decimal,
    pub deductible: Decimal,
    pub prior_auth_required: bool,
    pub message: &'static str,
}

/// Coverage window granted by a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoverageDates {
    pub effective: NaiveDate,
    pub expiration: NaiveDate,
}

impl CoverageDates {
    /// January 1 of the current year through December 31 of the next
    pub fn starting_year_of(today: NaiveDate) -> Self {
        let year = today.year();
        Self {
            effective: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today),
            expiration: NaiveDate::from_ymd_opt(year + 1, 12, 31).unwrap_or(today),
        }
    }
}

/// Input to a verification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationRequest {
    pub patient_id: Uuid,
    pub insurance_company: String,
    pub policy_number: String,
    pub group_number: Option<String>,
}

/// Eligibility check result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityResult {
    pub payer_type: PayerType,
    pub verified: bool,
    pub active: bool,
    pub message: String,
    pub prior_auth_required: bool,
    #[schema(value_type = String)]
    pub copay: Decimal,
    #[schema(value_type = String)]
    pub deductible: Decimal,
    pub coverage_dates: CoverageDates,
    pub checked_at: DateTime<Utc>,
}

/// Result of `verify`, after the coverage record has been stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationOutcome {
    pub insurance_id: Uuid,
    #[serde(flatten)]
    pub eligibility: EligibilityResult,
}

/// Stored coverage row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CoverageRecord {
    pub insurance_id: Uuid,
    pub patient_id: Uuid,
    pub insurance_company: String,
    pub policy_number: String,
    pub group_number: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub prior_authorization_required: bool,
    #[schema(value_type = String)]
    pub copay_amount: Decimal,
    #[schema(value_type = String)]
    pub deductible_amount: Decimal,
    pub status: String,
}

/// Current coverage plus whether it must be verified again
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverageStatus {
    #[serde(flatten)]
    pub coverage: CoverageRecord,
    pub payer_type: PayerType,
    pub needs_reverification: bool,
}

impl CoverageStatus {
    pub fn evaluate(coverage: CoverageRecord, today: NaiveDate) -> Self {
        let needs_reverification = coverage
            .expiration_date
            .map_or(true, |expiration| expiration < today);
        Self {
            payer_type: PayerType::classify(&coverage.insurance_company),
            coverage,
            needs_reverification,
        }
    }
}
