// Human-readable document numbers: PREFIX-YYYYMMDD-NNNN
use chrono::NaiveDate;
use rand::Rng;

/// Attempts before giving up on a collision-free number
pub const MAX_ATTEMPTS: usize = 5;

pub const CLAIM_PREFIX: &str = "CLM";
pub const PAYMENT_PREFIX: &str = "PMT";

pub fn document_number(prefix: &str, date: NaiveDate) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{prefix}-{}-{suffix}", date.format("%Y%m%d"))
}
