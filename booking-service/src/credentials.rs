// Argon2id password hashing for portal accounts
use crate::error::{BookingError, BookingResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Hash a password off the async runtime
pub async fn hash_password(password: String) -> BookingResult<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| BookingError::Credentials(format!("Password hashing task failed: {e}")))?
}

/// Check a password against a stored hash off the async runtime
pub async fn verify_password(password: String, hash: String) -> BookingResult<bool> {
    tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .map_err(|e| BookingError::Credentials(format!("Password verification task failed: {e}")))?
}

pub fn hash_blocking(password: &str) -> BookingResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BookingError::Credentials(format!("Failed to hash password: {e}")))
}

/// A malformed stored hash is an error; a wrong password is `Ok(false)`
pub fn verify_blocking(password: &str, hash: &str) -> BookingResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| BookingError::Credentials(format!("Invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_blocking("Kx7!pQ2mW9zR").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_blocking("Kx7!pQ2mW9zR", &hash).unwrap());
        assert!(!verify_blocking("wrong-password", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_blocking("anything", "not-a-hash").is_err());
    }

    #[test]
    fn async_wrappers_run_on_blocking_pool() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let hash = hash_password("S3cure!Pass".to_string()).await.unwrap();
            assert!(verify_password("S3cure!Pass".to_string(), hash).await.unwrap());
        });
    }
}
