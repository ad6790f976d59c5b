// Driver selection for a pickup
use crate::models::DriverCandidate;
use chrono::NaiveTime;
use std::cmp::Ordering;

/// A driver's working hours; an end before the start wraps past midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Both ends inclusive
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

impl From<&DriverCandidate> for ShiftWindow {
    fn from(driver: &DriverCandidate) -> Self {
        Self::new(driver.shift_start, driver.shift_end)
    }
}

/// Picks the driver for a pickup from the available candidates
///
/// Only drivers on shift at the pickup time qualify. Among those the
/// highest rating wins, then the fewest trips already booked that day.
#[derive(Debug, Default, Clone, Copy)]
pub struct DriverMatcher;

impl DriverMatcher {
    pub fn select(&self, candidates: &[DriverCandidate], pickup: NaiveTime) -> Option<DriverCandidate> {
        candidates
            .iter()
            .filter(|driver| ShiftWindow::from(*driver).contains(pickup))
            .min_by(|a, b| Self::rank(a, b))
            .cloned()
    }

    fn rank(a: &DriverCandidate, b: &DriverCandidate) -> Ordering {
        b.rating
            .cmp(&a.rating)
            .then(a.trips_that_day.cmp(&b.trips_that_day))
            .then(a.driver_id.cmp(&b.driver_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn driver(name: &str, shift: (u32, u32), rating: i64, trips: i64) -> DriverCandidate {
        DriverCandidate {
            driver_id: Uuid::new_v4(),
            first_name: name.into(),
            last_name: "Driver".into(),
            shift_start: at(shift.0, 0),
            shift_end: at(shift.1, 0),
            rating: Decimal::new(rating, 2),
            trips_that_day: trips,
        }
    }

    #[test]
    fn shift_window_bounds() {
        let day = ShiftWindow::new(at(6, 0), at(14, 0));
        assert!(day.contains(at(6, 0)));
        assert!(day.contains(at(14, 0)));
        assert!(!day.contains(at(14, 1)));

        let night = ShiftWindow::new(at(20, 0), at(4, 0));
        assert!(night.contains(at(23, 0)));
        assert!(night.contains(at(2, 0)));
        assert!(!night.contains(at(12, 0)));
    }

    #[test]
    fn ignores_drivers_off_shift() {
        let drivers = vec![driver("Late", (14, 22), 500, 0), driver("Early", (6, 14), 300, 4)];
        let chosen = DriverMatcher.select(&drivers, at(9, 30)).unwrap();
        assert_eq!(chosen.first_name, "Early");
    }

    #[test]
    fn prefers_rating_then_lighter_load() {
        let drivers = vec![
            driver("Busy", (6, 18), 490, 5),
            driver("Top", (6, 18), 495, 7),
            driver("Light", (6, 18), 490, 1),
        ];
        assert_eq!(DriverMatcher.select(&drivers, at(10, 0)).unwrap().first_name, "Top");

        let tied = vec![driver("Busy", (6, 18), 490, 5), driver("Light", (6, 18), 490, 1)];
        assert_eq!(DriverMatcher.select(&tied, at(10, 0)).unwrap().first_name, "Light");
    }

    #[test]
    fn no_candidate_on_shift() {
        let drivers = vec![driver("Night", (22, 5), 500, 0)];
        assert!(DriverMatcher.select(&drivers, at(12, 0)).is_none());
        assert!(DriverMatcher.select(&[], at(12, 0)).is_none());
    }
}
