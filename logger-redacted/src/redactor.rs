use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

lazy_static! {
    #[allow(clippy::expect_used)]
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern");
    #[allow(clippy::expect_used)]
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+1[-.\s]?)?\(?\b[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b").expect("phone pattern");
    #[allow(clippy::expect_used)]
    static ref MRN_REGEX: Regex =
        Regex::new(r"\bMRN-\d{8}-[A-Z0-9]{6}\b").expect("mrn pattern");
    #[allow(clippy::expect_used)]
    static ref DOB_REGEX: Regex =
        Regex::new(r"\b(?:19|20)\d{2}-\d{2}-\d{2}\b").expect("date pattern");
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_mrns: bool,
    pub redact_dates: bool,
    /// Replace matches with a short hash so log lines stay correlatable
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_mrns: true,
            // Trip and appointment dates share the same shape as birth dates.
            redact_dates: false,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", |m| {
                let (local, domain) = m.split_once('@').unwrap_or((m, ""));
                format!(
                    "{}***@{}***",
                    local.chars().next().unwrap_or('*'),
                    domain.chars().next().unwrap_or('*')
                )
            });
        }

        if self.config.redact_mrns {
            result = self.replace(&MRN_REGEX, &result, "MRN", |_| "MRN-********-******".to_string());
        }

        if self.config.redact_phones {
            result = self.replace(&PHONE_REGEX, &result, "PHONE", |_| "(***) ***-****".to_string());
        }

        if self.config.redact_dates {
            result = self.replace(&DOB_REGEX, &result, "DATE", |_| "****-**-**".to_string());
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn replace<F>(&self, pattern: &Regex, text: &str, label: &str, mask: F) -> String
    where
        F: Fn(&str) -> String,
    {
        pattern
            .replace_all(text, |caps: &Captures| {
                let matched = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("{label}[{}]", hash_value(matched))
                } else {
                    mask(matched)
                }
            })
            .to_string()
    }
}

/// First eight bytes of the SHA-256 digest, base64 encoded
pub fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::STANDARD.encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_email_redaction() {
        let redacted = masking().redact("Patient jane.roe@example.com booked");
        assert!(redacted.contains("j***@e***"));
        assert!(!redacted.contains("jane.roe"));
    }

    #[test]
    fn test_phone_redaction() {
        let redacted = masking().redact("Callback (555) 123-4567 requested");
        assert!(redacted.contains("(***) ***-****"));
    }

    #[test]
    fn test_mrn_redaction() {
        let redacted = masking().redact("created MRN-20240105-A1B2C3");
        assert_eq!(redacted, "created MRN-********-******");
    }

    #[test]
    fn test_hashes_are_stable() {
        let redactor = PiiRedactor::new(RedactionConfig::default());
        let a = redactor.redact("5551234567");
        let b = redactor.redact("5551234567");
        assert_eq!(a, b);
        assert!(a.starts_with("PHONE["));
    }

    #[test]
    fn test_dates_left_alone_by_default() {
        let redacted = masking().redact("trip on 2024-03-09");
        assert_eq!(redacted, "trip on 2024-03-09");
    }
}
