use crate::credentials::{hash_password, verify_password};
use crate::error::{BookingError, BookingResult};
use crate::identifiers::{medical_record_number, temporary_password, username, MAX_ATTEMPTS};
use crate::models::{NewAccount, NewPatient, RegisteredPatient, RegistrationRequest};
use crate::service::BookingService;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub const PATIENT_ROLE: &str = "patient";

/// Authenticated portal account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct StoredAccount {
    user_id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    status: String,
    patient_id: Option<Uuid>,
}

impl BookingService {
    /// Register a patient account explicitly
    ///
    /// Fails with [`BookingError::PhoneAlreadyRegistered`] instead of reusing
    /// the existing record, unlike booking.
    pub async fn register_patient(
        &self,
        request: RegistrationRequest,
        today: NaiveDate,
    ) -> BookingResult<RegisteredPatient> {
        let patient = request.patient.validate()?;
        let mut tx = self.transactions.begin().await?;

        let registered = create_patient(&mut tx, &patient, today)
            .await?
            .ok_or(BookingError::PhoneAlreadyRegistered)?;

        if let Some(street) = request
            .street_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(
                r#"
                INSERT INTO medical.patient_addresses
                    (patient_id, street_address, city, state, zip_code, is_primary)
                VALUES ($1, $2, $3, $4, $5, TRUE)
                "#,
            )
            .bind(registered.patient_id)
            .bind(street)
            .bind(request.city.as_deref())
            .bind(request.state.as_deref())
            .bind(request.zip_code.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            patient_id = %registered.patient_id,
            username = %registered.account.username,
            "Patient registered"
        );
        Ok(registered)
    }

    /// Check portal credentials
    pub async fn authenticate(&self, username: &str, password: &str) -> BookingResult<Account> {
        let stored = sqlx::query_as::<_, StoredAccount>(
            r#"
            SELECT u.user_id, u.username, u.password_hash, u.role, u.status, p.patient_id
            FROM security.users u
            LEFT JOIN medical.patients p ON p.user_id = u.user_id
            WHERE u.username = $1
            "#,
        )
        .bind(username.trim())
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(BookingError::InvalidCredentials)?;

        if stored.status != "active" {
            warn!(user_id = %stored.user_id, "Login attempt for inactive account");
            return Err(BookingError::InvalidCredentials);
        }
        if !verify_password(password.to_string(), stored.password_hash).await? {
            return Err(BookingError::InvalidCredentials);
        }

        Ok(Account {
            user_id: stored.user_id,
            username: stored.username,
            role: stored.role,
            patient_id: stored.patient_id,
        })
    }
}

pub(crate) async fn find_patient_by_phone(
    conn: &mut PgConnection,
    phone: &str,
) -> BookingResult<Option<Uuid>> {
    Ok(
        sqlx::query_scalar("SELECT patient_id FROM medical.patients WHERE phone = $1")
            .bind(phone)
            .fetch_optional(conn)
            .await?,
    )
}

/// Reuse the patient registered under this phone, or create one
///
/// Returns the credentials only when a new account was created.
pub(crate) async fn find_or_create_patient(
    conn: &mut PgConnection,
    patient: &NewPatient,
    today: NaiveDate,
) -> BookingResult<(Uuid, Option<NewAccount>)> {
    if let Some(patient_id) = find_patient_by_phone(conn, &patient.phone).await? {
        return Ok((patient_id, None));
    }

    match create_patient(conn, patient, today).await? {
        Some(registered) => Ok((registered.patient_id, Some(registered.account))),
        // Registered concurrently under the same phone; that insert has committed.
        None => find_patient_by_phone(conn, &patient.phone)
            .await?
            .map(|patient_id| (patient_id, None))
            .ok_or(BookingError::PhoneAlreadyRegistered),
    }
}

/// Create a user and patient row
///
/// Returns `None` when the phone is already registered. The user row is
/// removed again in that case so the caller's transaction stays clean.
pub(crate) async fn create_patient(
    conn: &mut PgConnection,
    patient: &NewPatient,
    today: NaiveDate,
) -> BookingResult<Option<RegisteredPatient>> {
    let password = temporary_password();
    let password_hash = hash_password(password.clone()).await?;

    let mut user = None;
    for _ in 0..MAX_ATTEMPTS {
        let candidate = username(&patient.first_name, &patient.last_name);
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO security.users (username, password_hash, email, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (username) DO NOTHING
            RETURNING user_id
            "#,
        )
        .bind(&candidate)
        .bind(&password_hash)
        .bind(patient.email.as_deref())
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(PATIENT_ROLE)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(user_id) = inserted {
            user = Some((user_id, candidate));
            break;
        }
    }
    let (user_id, username) = user.ok_or(BookingError::NumberExhausted("username"))?;

    for _ in 0..MAX_ATTEMPTS {
        let mrn = medical_record_number(today);
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO medical.patients
                (user_id, mrn, first_name, last_name, date_of_birth, gender, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            RETURNING patient_id
            "#,
        )
        .bind(user_id)
        .bind(&mrn)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.date_of_birth)
        .bind(patient.gender.as_deref())
        .bind(&patient.phone)
        .bind(patient.email.as_deref())
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(patient_id) = inserted {
            info!(
                patient_id = %patient_id,
                mrn = %logger_redacted::redact(&mrn),
                "Created patient record"
            );
            return Ok(Some(RegisteredPatient {
                patient_id,
                user_id,
                mrn,
                account: NewAccount {
                    username,
                    temporary_password: password,
                },
            }));
        }

        // The conflict was either the phone or the generated MRN.
        if find_patient_by_phone(conn, &patient.phone).await?.is_some() {
            sqlx::query("DELETE FROM security.users WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
            return Ok(None);
        }
    }

    Err(BookingError::NumberExhausted("medical record number"))
}
