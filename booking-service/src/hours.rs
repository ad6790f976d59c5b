// Business hours and request date/time parsing
use crate::error::{BookingError, BookingResult};
use chrono::{Duration, NaiveDate, NaiveTime};

/// Minutes between the default pickup and the appointment
pub const DEFAULT_PICKUP_LEAD_MINUTES: i64 = 30;

/// Service window for appointments and pickups: `open <= t < close`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::MIN + Duration::hours(6),
            close: NaiveTime::MIN + Duration::hours(22),
        }
    }
}

impl BusinessHours {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time < self.close
    }

    /// Reject a time outside the window
    pub fn check(&self, field: &'static str, time: NaiveTime) -> BookingResult<()> {
        if self.contains(time) {
            Ok(())
        } else {
            Err(BookingError::OutsideBusinessHours {
                field,
                time,
                open: self.open,
                close: self.close,
            })
        }
    }

    /// Pickup time used when the request gives none: a fixed lead before
    /// the appointment, never earlier than opening.
    pub fn default_pickup(&self, appointment: NaiveTime) -> NaiveTime {
        let lead = appointment - Duration::minutes(DEFAULT_PICKUP_LEAD_MINUTES);
        if lead < self.open || lead > appointment {
            self.open
        } else {
            lead
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, value: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

/// Parse an `HH:MM` time, seconds optional
pub fn parse_time(field: &str, value: &str) -> BookingResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| BookingError::Validation(format!("{field} must be a time in HH:MM format")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn window_is_half_open() {
        let hours = BusinessHours::default();
        assert!(!hours.contains(at(5, 59)));
        assert!(hours.contains(at(6, 0)));
        assert!(hours.contains(at(21, 59)));
        assert!(!hours.contains(at(22, 0)));
        assert!(!hours.contains(at(23, 30)));
    }

    #[test]
    fn check_reports_the_rejected_field() {
        let err = BusinessHours::default()
            .check("appointment_time", at(22, 15))
            .unwrap_err();
        match err {
            BookingError::OutsideBusinessHours { field, time, .. } => {
                assert_eq!(field, "appointment_time");
                assert_eq!(time, at(22, 15));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_pickup_leads_the_appointment() {
        let hours = BusinessHours::default();
        assert_eq!(hours.default_pickup(at(10, 0)), at(9, 30));
        assert_eq!(hours.default_pickup(at(6, 15)), at(6, 0));
    }

    #[test]
    fn parses_request_formats() {
        assert_eq!(parse_time("t", "09:45").unwrap(), at(9, 45));
        assert_eq!(parse_time("t", "09:45:00").unwrap(), at(9, 45));
        assert!(parse_time("t", "9am").is_err());
        assert_eq!(
            parse_date("d", "2025-03-14").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
        assert!(parse_date("d", "03/14/2025").is_err());
    }
}
