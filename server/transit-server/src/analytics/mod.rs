//! Read-only reporting over the operational tables and the warehouse
//!
//! Operational reports (`dashboard`, `revenue`, `operations`, `patients`)
//! aggregate live trips, claims and patients. The summary and revenue trend
//! read the pre-aggregated warehouse tables, which may live in a separate
//! database.

pub mod operational;
pub mod warehouse;

pub use operational::*;
pub use warehouse::*;

use crate::error::ApiError;
use crate::validate_range;
use crate::validation::RequestValidation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_DAYS: i64 = 30;
pub const MAX_DAYS: i64 = 365;

/// Days shown in the summary's recent activity table
pub const RECENT_ACTIVITY_DAYS: i64 = 14;

/// On-time percentage at or above which a day is on track
pub const ON_TIME_TARGET: i64 = 90;

/// Reporting window in days
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct DaysQuery {
    /// Days to look back (1 to 365, default 30)
    pub days: Option<i64>,
}

impl DaysQuery {
    pub fn days(&self) -> i64 {
        self.days.unwrap_or(DEFAULT_DAYS)
    }
}

impl RequestValidation for DaysQuery {
    fn validate(&self) -> Result<(), ApiError> {
        validate_range!(self.days(), 1, MAX_DAYS, "days must be between 1 and 365");
        Ok(())
    }
}

/// Row shape for `GROUP BY` counts keyed by a status column
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StatusCount {
    pub status: String,
    pub count: i64,
}

pub(crate) fn status_map(rows: Vec<StatusCount>) -> BTreeMap<String, i64> {
    rows.into_iter().map(|r| (r.status, r.count)).collect()
}

/// Paid as a percentage of billed, two decimal places
pub fn collection_rate(paid: Decimal, billed: Decimal) -> Decimal {
    if billed.is_zero() {
        return Decimal::ZERO;
    }
    (paid / billed * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Completed trips per driver, one decimal place; zero without drivers
pub fn trips_per_driver(completed: i64, drivers: i32) -> Decimal {
    if drivers <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(completed) / Decimal::from(drivers)).round_dp(1)
}

/// Label for a day's on-time percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ActivityStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl ActivityStatus {
    pub fn for_on_time(pct: Decimal) -> Self {
        if pct >= Decimal::from(ON_TIME_TARGET) {
            Self::OnTrack
        } else {
            Self::NeedsReview
        }
    }
}
