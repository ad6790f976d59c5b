//! JWT issue and validation for the patient portal
//!
//! Tokens are HS256-signed with the configured secret and carry the user id,
//! role and (for patients) the linked patient id.

use booking_service::Account;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const ISSUER: &str = "transit-engine";

/// JWT token claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Role name (`patient`, `dispatcher`, `admin`)
    pub role: String,
    /// Linked patient record, absent for staff accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    /// Issuer
    pub iss: String,
    /// Issued at timestamp (seconds since epoch)
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,
}

/// Login response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub user_id: Uuid,
    pub role: String,
    pub patient_id: Option<Uuid>,
}

/// Signs and validates portal tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issue a token for an authenticated account
    pub fn issue(&self, account: &Account) -> jsonwebtoken::errors::Result<IssuedToken> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: account.user_id,
            role: account.role.clone(),
            patient_id: account.patient_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(IssuedToken {
            access_token: self.sign(&claims)?,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl.num_seconds(),
            user_id: account.user_id,
            role: account.role.clone(),
            patient_id: account.patient_id,
        })
    }

    pub fn sign(&self, claims: &TokenClaims) -> jsonwebtoken::errors::Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Validate signature, issuer and expiry
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[ISSUER]);
        decode::<TokenClaims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn patient_account() -> Account {
        Account {
            user_id: Uuid::new_v4(),
            username: "mlopez1234".into(),
            role: "patient".into(),
            patient_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let service = TokenService::new(SECRET, 3600);
        let account = patient_account();
        let issued = service.issue(&account).unwrap();
        let claims = service.verify(&issued.access_token).unwrap();

        assert_eq!(claims.sub, account.user_id);
        assert_eq!(claims.patient_id, account.patient_id);
        assert_eq!(claims.role, "patient");
        assert_eq!(issued.expires_in, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issued = TokenService::new(SECRET, 3600).issue(&patient_account()).unwrap();
        let other = TokenService::new("a-different-secret-of-sufficient-length", 3600);
        assert!(other.verify(&issued.access_token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = TokenService::new(SECRET, 3600);
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: Uuid::new_v4(),
            role: "patient".into(),
            patient_id: None,
            iss: ISSUER.into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.sign(&claims).unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(TokenService::new(SECRET, 60).verify("not.a.jwt").is_err());
    }
}
