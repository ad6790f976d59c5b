//! Authentication context extraction
//!
//! Handlers that take an [`AuthContext`] argument only run for requests that
//! carry a valid bearer token; everything else is rejected with 401.

use crate::error::ApiError;
use crate::server::TransitServer;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use booking_service::PATIENT_ROLE;
use uuid::Uuid;

/// Roles allowed to read and update any patient's records
pub const STAFF_ROLES: [&str; 2] = ["dispatcher", "admin"];

/// Authentication context extracted from the JWT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: String,
    pub patient_id: Option<Uuid>,
}

impl AuthContext {
    pub fn is_staff(&self) -> bool {
        STAFF_ROLES.contains(&self.role.as_str())
    }

    /// Resolve which patient a request targets and check access
    ///
    /// Without an explicit target a patient acts on their own record. Patients
    /// may only touch their own record; staff must name the patient.
    pub fn authorize_patient(&self, target: Option<Uuid>) -> Result<Uuid, ApiError> {
        match (target, self.patient_id) {
            (Some(target), _) if self.is_staff() => Ok(target),
            (None, _) if self.is_staff() => Err(ApiError::validation(
                "patient_id is required for staff accounts",
            )),
            (Some(target), Some(own)) if target == own => Ok(own),
            (None, Some(own)) if self.role == PATIENT_ROLE => Ok(own),
            (Some(_), Some(_)) => Err(ApiError::authorization(
                "Patients may only access their own records",
            )),
            _ => Err(ApiError::authorization(
                "Account is not linked to a patient record",
            )),
        }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

#[async_trait]
impl FromRequestParts<TransitServer> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        server: &TransitServer,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let claims = server.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::authentication("Invalid or expired token")
        })?;

        Ok(AuthContext {
            user_id: claims.sub,
            role: claims.role,
            patient_id: claims.patient_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn patient(id: Uuid) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role: PATIENT_ROLE.into(),
            patient_id: Some(id),
        }
    }

    fn staff() -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role: "dispatcher".into(),
            patient_id: None,
        }
    }

    #[test]
    fn patient_defaults_to_own_record() {
        let own = Uuid::new_v4();
        assert_eq!(patient(own).authorize_patient(None).unwrap(), own);
        assert_eq!(patient(own).authorize_patient(Some(own)).unwrap(), own);
    }

    #[test]
    fn patient_cannot_read_another_record() {
        let err = patient(Uuid::new_v4())
            .authorize_patient(Some(Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn staff_reads_any_named_record() {
        let target = Uuid::new_v4();
        assert_eq!(staff().authorize_patient(Some(target)).unwrap(), target);
        assert_eq!(
            staff().authorize_patient(None).unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
