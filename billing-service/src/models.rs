use chrono::{DateTime, NaiveDate, Utc};
use insurance_service::PayerType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Level of transport, which selects the rate schedule and HCPCS code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Ambulatory,
    #[default]
    Wheelchair,
    Stretcher,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Ambulatory => "ambulatory",
            ServiceType::Wheelchair => "wheelchair",
            ServiceType::Stretcher => "stretcher",
        }
    }

    /// HCPCS code billed on the base transport line
    pub fn base_code(self) -> &'static str {
        match self {
            ServiceType::Ambulatory => "A0100",
            ServiceType::Wheelchair => "A0130",
            ServiceType::Stretcher => "T2005",
        }
    }

    pub fn base_description(self) -> &'static str {
        match self {
            ServiceType::Ambulatory => "Non-emergency ambulatory transport",
            ServiceType::Wheelchair => "Non-emergency wheelchair van transport",
            ServiceType::Stretcher => "Non-emergency stretcher van transport",
        }
    }
}

/// HCPCS code billed on the mileage line
pub const MILEAGE_CODE: &str = "S0215";

/// Claim lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Draft,
    Pending,
    Submitted,
    PartiallyPaid,
    Paid,
    Denied,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Pending => "pending",
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::PartiallyPaid => "partially_paid",
            ClaimStatus::Paid => "paid",
            ClaimStatus::Denied => "denied",
        }
    }

    /// Statuses listed as awaiting submission
    pub const AWAITING_SUBMISSION: [ClaimStatus; 2] = [ClaimStatus::Draft, ClaimStatus::Pending];

    /// Statuses that carry an outstanding receivable
    pub const OUTSTANDING: [ClaimStatus; 2] = [ClaimStatus::Submitted, ClaimStatus::PartiallyPaid];

    pub fn can_submit(self) -> bool {
        Self::AWAITING_SUBMISSION.contains(&self)
    }

    pub fn accepts_payment(self) -> bool {
        Self::OUTSTANDING.contains(&self)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ClaimStatus::Draft),
            "pending" => Ok(ClaimStatus::Pending),
            "submitted" => Ok(ClaimStatus::Submitted),
            "partially_paid" => Ok(ClaimStatus::PartiallyPaid),
            "paid" => Ok(ClaimStatus::Paid),
            "denied" => Ok(ClaimStatus::Denied),
            other => Err(format!("unknown claim status: {other}")),
        }
    }
}

/// How a remittance was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Eft,
    Ach,
    Check,
    CreditCard,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Eft => "eft",
            PaymentMethod::Ach => "ach",
            PaymentMethod::Check => "check",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Cash => "cash",
        }
    }
}

/// Active rate schedule row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct RateSchedule {
    pub rate_id: Uuid,
    pub payer_type: String,
    pub service_type: String,
    pub base_rate: Decimal,
    pub per_mile_rate: Decimal,
    pub wait_time_rate: Decimal,
    pub after_hours_surcharge: Decimal,
    pub weekend_surcharge: Decimal,
}

/// Claim header joined with patient, insurance and trip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Claim {
    pub claim_id: Uuid,
    pub claim_number: String,
    pub trip_id: Uuid,
    pub trip_number: String,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub insurance_company: String,
    pub policy_number: String,
    pub payer_type: String,
    pub service_type: String,
    pub service_date: NaiveDate,
    pub claim_status: String,
    pub total_amount: Decimal,
    pub approved_amount: Option<Decimal>,
    pub paid_amount: Decimal,
    pub patient_responsibility: Decimal,
    pub submission_date: Option<DateTime<Utc>>,
    pub payment_date: Option<NaiveDate>,
    pub denial_reason: Option<String>,
    pub payer_claim_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct ClaimLineItem {
    pub line_number: i32,
    pub service_code: String,
    pub service_description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Claim with its line items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimDetail {
    #[serde(flatten)]
    pub claim: Claim,
    pub line_items: Vec<ClaimLineItem>,
}

/// Row of the pending-claims work queue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct PendingClaim {
    pub claim_id: Uuid,
    pub claim_number: String,
    pub service_date: NaiveDate,
    pub total_amount: Decimal,
    pub claim_status: String,
    pub patient_name: String,
    pub insurance_company: String,
    pub trip_number: String,
}

/// Request to generate a claim from a completed trip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateClaimRequest {
    pub trip_id: Uuid,
    /// Defaults to wheelchair
    #[serde(default)]
    pub service_type: Option<ServiceType>,
    /// Billed miles; estimated when omitted
    #[serde(default)]
    pub mileage: Option<Decimal>,
}

/// Price breakdown reported with a generated claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClaimBreakdown {
    pub base_charge: Decimal,
    pub mileage: Decimal,
    pub per_mile_rate: Decimal,
    pub mileage_charge: Decimal,
    pub weekend_surcharge: Decimal,
    pub patient_copay: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedClaim {
    pub claim_id: Uuid,
    pub claim_number: String,
    pub claim_status: ClaimStatus,
    pub total_amount: Decimal,
    pub breakdown: ClaimBreakdown,
    pub payer_type: PayerType,
    pub service_type: ServiceType,
    pub insurance_company: String,
    pub service_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitClaimRequest {
    pub claim_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmittedClaim {
    pub claim_id: Uuid,
    pub claim_number: String,
    pub claim_status: ClaimStatus,
    pub submission_date: DateTime<Utc>,
}

/// Payment posted against a submitted claim
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostPaymentRequest {
    pub claim_id: Uuid,
    pub payment_amount: Decimal,
    pub payment_date: NaiveDate,
    pub payer_name: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    pub check_number: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentReceipt {
    pub payment_id: Uuid,
    pub payment_number: String,
    pub claim_id: Uuid,
    pub previous_status: ClaimStatus,
    pub claim_status: ClaimStatus,
    pub payment_amount: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
}
