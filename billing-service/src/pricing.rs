use crate::error::{BillingError, BillingResult};
use crate::models::{ClaimBreakdown, RateSchedule};
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};

/// Longest billable trip
pub const MAX_MILEAGE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 2); // 1000.00

/// Largest amount a `NUMERIC(10, 2)` money column can hold
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 2); // 99999999.99

/// Priced claim before it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPricing {
    pub base_charge: Decimal,
    pub mileage: Decimal,
    pub per_mile_rate: Decimal,
    pub mileage_charge: Decimal,
    pub weekend_surcharge: Decimal,
    pub total: Decimal,
}

impl ClaimPricing {
    /// `base_rate + mileage * per_mile_rate`, plus the weekend surcharge
    /// when the service date falls on a Saturday or Sunday
    pub fn compute(
        rates: &RateSchedule,
        mileage: Decimal,
        service_date: NaiveDate,
    ) -> BillingResult<Self> {
        let mileage = validate_mileage(mileage)?;
        let mileage_charge = mileage
            .checked_mul(rates.per_mile_rate)
            .map(round_cents)
            .ok_or_else(out_of_range)?;
        let weekend_surcharge = if is_weekend(service_date) {
            rates.weekend_surcharge
        } else {
            Decimal::ZERO
        };
        let total = rates
            .base_rate
            .checked_add(mileage_charge)
            .and_then(|sum| sum.checked_add(weekend_surcharge))
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or_else(out_of_range)?;

        Ok(Self {
            base_charge: rates.base_rate,
            mileage,
            per_mile_rate: rates.per_mile_rate,
            mileage_charge,
            weekend_surcharge,
            total,
        })
    }

    pub fn breakdown(&self, patient_copay: Decimal) -> ClaimBreakdown {
        ClaimBreakdown {
            base_charge: self.base_charge,
            mileage: self.mileage,
            per_mile_rate: self.per_mile_rate,
            mileage_charge: self.mileage_charge,
            weekend_surcharge: self.weekend_surcharge,
            patient_copay,
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Billable miles rounded to the cent, within `0 < miles <= MAX_MILEAGE`
pub fn validate_mileage(mileage: Decimal) -> BillingResult<Decimal> {
    let mileage = round_cents(mileage);
    if mileage <= Decimal::ZERO {
        return Err(BillingError::Validation("mileage must be positive".into()));
    }
    if mileage > MAX_MILEAGE {
        return Err(BillingError::Validation(format!(
            "mileage must not exceed {MAX_MILEAGE}"
        )));
    }
    Ok(mileage)
}

fn out_of_range() -> BillingError {
    BillingError::Validation("claim amount is out of range".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rates() -> RateSchedule {
        RateSchedule {
            rate_id: Uuid::new_v4(),
            payer_type: "medi-cal".into(),
            service_type: "wheelchair".into(),
            base_rate: Decimal::new(4500, 2),
            per_mile_rate: Decimal::new(250, 2),
            wait_time_rate: Decimal::new(50, 2),
            after_hours_surcharge: Decimal::new(1500, 2),
            weekend_surcharge: Decimal::new(1500, 2),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_total_is_base_plus_mileage() {
        // 2024-03-06 is a Wednesday
        let pricing = ClaimPricing::compute(&rates(), Decimal::new(1000, 2), date(2024, 3, 6)).unwrap();
        assert_eq!(pricing.mileage_charge, Decimal::new(2500, 2));
        assert_eq!(pricing.weekend_surcharge, Decimal::ZERO);
        assert_eq!(pricing.total, Decimal::new(7000, 2));
    }

    #[test]
    fn weekend_adds_surcharge() {
        for day in [date(2024, 3, 9), date(2024, 3, 10)] {
            let pricing = ClaimPricing::compute(&rates(), Decimal::new(1000, 2), day).unwrap();
            assert_eq!(pricing.weekend_surcharge, Decimal::new(1500, 2));
            assert_eq!(pricing.total, Decimal::new(8500, 2));
        }
    }

    #[test]
    fn friday_and_monday_are_weekdays() {
        assert!(!is_weekend(date(2024, 3, 8)));
        assert!(!is_weekend(date(2024, 3, 11)));
    }

    #[test]
    fn mileage_charge_is_rounded_to_cents() {
        let mut schedule = rates();
        schedule.per_mile_rate = Decimal::new(2375, 3); // 2.375 per mile
        let pricing = ClaimPricing::compute(&schedule, Decimal::new(333, 2), date(2024, 3, 6)).unwrap();
        // 3.33 * 2.375 = 7.90875
        assert_eq!(pricing.mileage_charge, Decimal::new(791, 2));
        assert_eq!(pricing.total, Decimal::new(5291, 2));
    }

    #[test]
    fn money_limits_match_column_precision() {
        assert_eq!(MAX_MILEAGE.to_string(), "1000.00");
        assert_eq!(MAX_AMOUNT.to_string(), "99999999.99");
    }

    #[test]
    fn mileage_at_limit_is_priced() {
        let pricing = ClaimPricing::compute(&rates(), MAX_MILEAGE, date(2024, 3, 6)).unwrap();
        assert_eq!(pricing.mileage_charge, Decimal::new(250_000, 2));
        assert_eq!(pricing.total, Decimal::new(254_500, 2));
    }

    #[test]
    fn mileage_over_limit_is_rejected() {
        let just_over = MAX_MILEAGE + Decimal::new(1, 2);
        for miles in [just_over, Decimal::MAX] {
            let err = ClaimPricing::compute(&rates(), miles, date(2024, 3, 6)).unwrap_err();
            assert!(matches!(err, BillingError::Validation(_)));
        }
    }

    #[test]
    fn non_positive_mileage_is_rejected() {
        assert!(validate_mileage(Decimal::ZERO).is_err());
        assert!(validate_mileage(Decimal::new(-5, 0)).is_err());
        // rounds to zero cents
        assert!(validate_mileage(Decimal::new(4, 3)).is_err());
    }

    #[test]
    fn total_beyond_column_precision_is_rejected() {
        let mut schedule = rates();
        schedule.base_rate = MAX_AMOUNT;
        let err = ClaimPricing::compute(&schedule, Decimal::ONE, date(2024, 3, 6)).unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));

        schedule.base_rate = Decimal::MAX;
        assert!(ClaimPricing::compute(&schedule, Decimal::ONE, date(2024, 3, 6)).is_err());
    }

    #[test]
    fn breakdown_carries_copay() {
        let pricing = ClaimPricing::compute(&rates(), Decimal::new(500, 2), date(2024, 3, 6)).unwrap();
        let breakdown = pricing.breakdown(Decimal::new(15, 0));
        assert_eq!(breakdown.patient_copay, Decimal::new(15, 0));
        assert_eq!(breakdown.mileage_charge, Decimal::new(1250, 2));
    }
}
