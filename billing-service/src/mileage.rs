use rand::Rng;
use rust_decimal::Decimal;

/// Billable distance between two addresses
pub trait MileageEstimator: Send + Sync {
    fn estimate(&self, pickup_address: &str, dropoff_address: &str) -> Decimal;
}

/// Placeholder until a routing provider is wired in: a uniform 3.00 to
/// 15.00 miles, to the cent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMileageEstimator;

impl MileageEstimator for RandomMileageEstimator {
    fn estimate(&self, _pickup_address: &str, _dropoff_address: &str) -> Decimal {
        let hundredths: i64 = rand::thread_rng().gen_range(300..=1500);
        Decimal::new(hundredths, 2)
    }
}

/// Always reports the same distance
#[derive(Debug, Clone, Copy)]
pub struct FixedMileage(pub Decimal);

impl MileageEstimator for FixedMileage {
    fn estimate(&self, _pickup_address: &str, _dropoff_address: &str) -> Decimal {
        self.0
    }
}
