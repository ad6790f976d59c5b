// Generated trip numbers, medical record numbers and portal usernames
use chrono::NaiveDate;
use rand::distributions::{Alphanumeric, Uniform};
use rand::Rng;

/// Attempts before giving up on a collision-free identifier
pub const MAX_ATTEMPTS: usize = 5;

const TEMP_PASSWORD_LEN: usize = 12;
const PASSWORD_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!@#$%&*";

/// `GVT-YYYYMMDD-NNNN`
pub fn trip_number(date: NaiveDate) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("GVT-{}-{suffix}", date.format("%Y%m%d"))
}

/// `MRN-YYYYMMDD-XXXXXX` with an uppercase alphanumeric tail
pub fn medical_record_number(date: NaiveDate) -> String {
    let tail: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("MRN-{}-{tail}", date.format("%Y%m%d"))
}

/// First initial, last name and four digits, lowercase ASCII
pub fn username(first_name: &str, last_name: &str) -> String {
    let initial: String = first_name
        .chars()
        .find(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_default();
    let last: String = last_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let digits: u16 = rand::thread_rng().gen_range(1000..=9999);
    let stem = format!("{initial}{last}");
    if stem.is_empty() {
        format!("patient{digits}")
    } else {
        format!("{stem}{digits}")
    }
}

pub fn temporary_password() -> String {
    let pick = Uniform::from(0..PASSWORD_CHARSET.len());
    let mut rng = rand::thread_rng();
    (0..TEMP_PASSWORD_LEN)
        .filter_map(|_| PASSWORD_CHARSET.get(rng.sample(pick)).map(|b| char::from(*b)))
        .collect()
}
