//! Patient profile reads and updates for the portal

use crate::error::ApiError;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_length};
use chrono::NaiveDate;
use insurance_service::CoverageRecord;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub street: String,
    pub apartment: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MedicalInfo {
    pub mobility_equipment: Option<String>,
    pub assistance_level: Option<String>,
    pub oxygen_required: bool,
    pub medical_notes: Option<String>,
    pub requires_assistance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientProfile {
    pub patient_id: Uuid,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub emergency_contact: EmergencyContact,
    /// Primary address
    pub address: Option<Address>,
    /// Active primary coverage
    pub insurance: Option<CoverageRecord>,
    pub medical: Option<MedicalInfo>,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    patient_id: Uuid,
    mrn: String,
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    phone: String,
    email: Option<String>,
    emergency_contact_name: Option<String>,
    emergency_contact_phone: Option<String>,
    emergency_contact_relationship: Option<String>,
    street_address: Option<String>,
    apartment_unit: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    has_medical_info: bool,
    mobility_equipment: Option<String>,
    assistance_level: Option<String>,
    oxygen_required: Option<bool>,
    medical_notes: Option<String>,
    requires_assistance: Option<bool>,
}

impl ProfileRow {
    fn into_profile(self, insurance: Option<CoverageRecord>) -> PatientProfile {
        let address = self.street_address.map(|street| Address {
            street,
            apartment: self.apartment_unit,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
        });
        let medical = self.has_medical_info.then(|| MedicalInfo {
            mobility_equipment: self.mobility_equipment,
            assistance_level: self.assistance_level,
            oxygen_required: self.oxygen_required.unwrap_or(false),
            medical_notes: self.medical_notes,
            requires_assistance: self.requires_assistance.unwrap_or(false),
        });

        PatientProfile {
            patient_id: self.patient_id,
            mrn: self.mrn,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            phone: self.phone,
            email: self.email,
            emergency_contact: EmergencyContact {
                name: self.emergency_contact_name,
                phone: self.emergency_contact_phone,
                relationship: self.emergency_contact_relationship,
            },
            address,
            insurance,
            medical,
        }
    }
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl RequestValidation for ProfileUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(first_name) = &self.first_name {
            validate_length!(first_name.trim(), 1, 100, "first_name must be 1 to 100 characters");
        }
        if let Some(last_name) = &self.last_name {
            validate_length!(last_name.trim(), 1, 100, "last_name must be 1 to 100 characters");
        }
        if let Some(email) = &self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

impl ProfileUpdate {
    /// Trimmed names and a digits-only phone, ready to bind
    fn normalized(self) -> Result<Self, ApiError> {
        let phone = self
            .phone
            .as_deref()
            .map(booking_service::normalize_phone)
            .transpose()?;
        Ok(Self {
            first_name: self.first_name.map(|v| v.trim().to_string()),
            last_name: self.last_name.map(|v| v.trim().to_string()),
            phone,
            email: self.email.map(|v| v.trim().to_string()),
        })
    }
}

pub async fn load_profile(pool: &PgPool, patient_id: Uuid) -> Result<PatientProfile, ApiError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT p.patient_id, p.mrn, p.first_name, p.last_name, p.date_of_birth, p.gender,
               p.phone, p.email,
               p.emergency_contact_name, p.emergency_contact_phone,
               p.emergency_contact_relationship,
               a.street_address, a.apartment_unit, a.city, a.state, a.zip_code,
               (m.patient_id IS NOT NULL) AS has_medical_info,
               m.mobility_equipment, m.assistance_level, m.oxygen_required,
               m.medical_notes, m.requires_assistance
        FROM medical.patients p
        LEFT JOIN LATERAL (
            SELECT street_address, apartment_unit, city, state, zip_code
            FROM medical.patient_addresses
            WHERE patient_id = p.patient_id AND is_primary
            LIMIT 1
        ) a ON TRUE
        LEFT JOIN medical.patient_medical_info m ON m.patient_id = p.patient_id
        WHERE p.patient_id = $1
        "#,
    )
    .bind(patient_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("patient"))?;

    let insurance = sqlx::query_as::<_, CoverageRecord>(
        r#"
        SELECT insurance_id, patient_id, insurance_company, policy_number, group_number,
               effective_date, expiration_date, prior_authorization_required,
               copay_amount, deductible_amount, status
        FROM medical.patient_insurance
        WHERE patient_id = $1 AND is_primary AND status = 'active'
        "#,
    )
    .bind(patient_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.into_profile(insurance))
}

/// Apply a partial update and return the refreshed profile
///
/// A phone number already used by another patient is a 409.
pub async fn update_profile(
    pool: &PgPool,
    patient_id: Uuid,
    update: ProfileUpdate,
) -> Result<PatientProfile, ApiError> {
    update.validate()?;
    let update = update.normalized()?;

    let result = sqlx::query(
        r#"
        UPDATE medical.patients
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone = COALESCE($4, phone),
            email = COALESCE($5, email),
            updated_at = NOW()
        WHERE patient_id = $1
        "#,
    )
    .bind(patient_id)
    .bind(update.first_name)
    .bind(update.last_name)
    .bind(update.phone)
    .bind(update.email)
    .execute(pool)
    .await
    .map_err(|e| {
        if database_layer::is_unique_violation(&e) {
            ApiError::conflict("A patient with this phone number is already registered")
        } else {
            ApiError::from(e)
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("patient"));
    }

    tracing::info!(patient_id = %patient_id, "Patient profile updated");
    load_profile(pool, patient_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_valid() {
        assert!(ProfileUpdate::default().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let update = ProfileUpdate {
            first_name: Some("   ".into()),
            ..ProfileUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn email_without_at_is_rejected() {
        let update = ProfileUpdate {
            email: Some("maria.example.com".into()),
            ..ProfileUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn phone_is_reduced_to_digits() {
        let update = ProfileUpdate {
            phone: Some("(916) 555-0142".into()),
            first_name: Some("  Maria ".into()),
            ..ProfileUpdate::default()
        };
        let normalized = update.normalized().unwrap();
        assert_eq!(normalized.phone.as_deref(), Some("9165550142"));
        assert_eq!(normalized.first_name.as_deref(), Some("Maria"));
    }

    #[test]
    fn short_phone_is_rejected() {
        let update = ProfileUpdate {
            phone: Some("555-0142".into()),
            ..ProfileUpdate::default()
        };
        assert!(update.normalized().is_err());
    }

    #[test]
    fn missing_address_and_medical_rows_are_omitted() {
        let row = ProfileRow {
            patient_id: Uuid::new_v4(),
            mrn: "MRN-20250310-ABC123".into(),
            first_name: "Maria".into(),
            last_name: "Lopez".into(),
            date_of_birth: None,
            gender: None,
            phone: "9165550142".into(),
            email: None,
            emergency_contact_name: Some("Ana Lopez".into()),
            emergency_contact_phone: None,
            emergency_contact_relationship: Some("daughter".into()),
            street_address: None,
            apartment_unit: None,
            city: None,
            state: None,
            zip_code: None,
            has_medical_info: false,
            mobility_equipment: None,
            assistance_level: None,
            oxygen_required: None,
            medical_notes: None,
            requires_assistance: None,
        };
        let profile = row.into_profile(None);
        assert!(profile.address.is_none());
        assert!(profile.medical.is_none());
        assert_eq!(profile.emergency_contact.name.as_deref(), Some("Ana Lopez"));
    }
}
