use crate::error::{BookingError, BookingResult};
use crate::hours::{parse_date, parse_time, BusinessHours};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Trip lifecycle status as stored in `operations.trips.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Scheduled,
    Confirmed,
    Assigned,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Scheduled => "scheduled",
            TripStatus::Confirmed => "confirmed",
            TripStatus::Assigned => "assigned",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    /// Still ahead of the patient
    pub fn is_open(self) -> bool {
        matches!(
            self,
            TripStatus::Scheduled | TripStatus::Confirmed | TripStatus::Assigned
        )
    }

    pub fn can_assign(self) -> bool {
        self == TripStatus::Scheduled
    }

    pub fn can_complete(self) -> bool {
        self == TripStatus::Assigned
    }

    pub fn can_cancel(self) -> bool {
        self.is_open()
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(TripStatus::Scheduled),
            "confirmed" => Ok(TripStatus::Confirmed),
            "assigned" => Ok(TripStatus::Assigned),
            "completed" => Ok(TripStatus::Completed),
            "cancelled" => Ok(TripStatus::Cancelled),
            other => Err(format!("unknown trip status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn as_str(self) -> &'static str {
        match self {
            TripType::OneWay => "one_way",
            TripType::RoundTrip => "round_trip",
        }
    }
}

/// Trip details shared by the public booking form and the portal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    /// `YYYY-MM-DD`
    pub appointment_date: String,
    /// `HH:MM`
    pub appointment_time: String,
    /// `HH:MM`; defaults to shortly before the appointment
    pub pickup_time: Option<String>,
    pub trip_type: Option<TripType>,
    pub special_instructions: Option<String>,
}

/// A trip request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSchedule {
    pub trip_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub pickup_time: NaiveTime,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub trip_type: TripType,
    pub special_instructions: Option<String>,
}

impl TripSchedule {
    pub fn scheduled_pickup(&self) -> NaiveDateTime {
        self.trip_date.and_time(self.pickup_time)
    }
}

impl TripRequest {
    /// Validate the request and resolve its date and times
    ///
    /// Runs before any database access so a rejected request writes nothing.
    pub fn schedule(&self, hours: &BusinessHours, today: NaiveDate) -> BookingResult<TripSchedule> {
        let pickup_address = required("pickup_address", &self.pickup_address)?;
        let dropoff_address = required("dropoff_address", &self.dropoff_address)?;
        let trip_date = parse_date("appointment_date", &self.appointment_date)?;
        if trip_date < today {
            return Err(BookingError::Validation(
                "appointment_date cannot be in the past".into(),
            ));
        }

        let appointment_time = parse_time("appointment_time", &self.appointment_time)?;
        hours.check("appointment_time", appointment_time)?;

        let pickup_time = match self.pickup_time.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let pickup = parse_time("pickup_time", raw)?;
                hours.check("pickup_time", pickup)?;
                pickup
            }
            _ => hours.default_pickup(appointment_time),
        };

        Ok(TripSchedule {
            trip_date,
            appointment_time,
            pickup_time,
            pickup_address,
            dropoff_address,
            trip_type: self.trip_type.unwrap_or_default(),
            special_instructions: optional(self.special_instructions.as_deref()),
        })
    }
}

/// Public booking form: patient identity plus the trip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingRequest {
    #[serde(flatten)]
    pub patient: PatientDetails,
    #[serde(flatten)]
    pub trip: TripRequest,
}

/// Identity fields used to find or register a patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
}

/// Patient details after validation; the phone is reduced to digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
}

impl PatientDetails {
    pub fn validate(&self) -> BookingResult<NewPatient> {
        let first_name = required("first_name", &self.first_name)?;
        let last_name = required("last_name", &self.last_name)?;
        let phone = normalize_phone(&self.phone)?;
        let email = optional(self.email.as_deref());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(BookingError::Validation("email is not a valid address".into()));
            }
        }
        let date_of_birth = match optional(self.date_of_birth.as_deref()) {
            Some(raw) => Some(parse_date("date_of_birth", &raw)?),
            None => None,
        };

        Ok(NewPatient {
            first_name,
            last_name,
            phone,
            email,
            date_of_birth,
            gender: optional(self.gender.as_deref()),
        })
    }
}

/// Explicit portal registration with an optional home address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    #[serde(flatten)]
    pub patient: PatientDetails,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// Credentials issued to a newly created patient account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewAccount {
    pub username: String,
    pub temporary_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredPatient {
    pub patient_id: Uuid,
    pub user_id: Uuid,
    pub mrn: String,
    pub account: NewAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssignedDriver {
    pub driver_id: Uuid,
    pub driver_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingOutcome {
    pub patient_id: Uuid,
    pub is_new_patient: bool,
    /// Present only when the booking created the patient
    pub account: Option<NewAccount>,
    pub trip_id: Uuid,
    pub trip_number: String,
    pub trip_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub status: TripStatus,
    pub driver: Option<AssignedDriver>,
}

/// Trip row as read by dispatch and the portal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Trip {
    pub trip_id: Uuid,
    pub trip_number: String,
    pub patient_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub trip_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub appointment_time: NaiveTime,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub status: String,
    pub trip_type: String,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Available driver considered for a pickup
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DriverCandidate {
    pub driver_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub rating: Decimal,
    pub trips_that_day: i64,
}

impl DriverCandidate {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Trip {
    /// Open and dated today or later; unknown statuses never count
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.trip_date >= today
            && self
                .status
                .parse::<TripStatus>()
                .map(TripStatus::is_open)
                .unwrap_or(false)
    }
}

/// A patient's trips split for the portal
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PatientTrips {
    pub upcoming: Vec<Trip>,
    pub history: Vec<Trip>,
}

impl PatientTrips {
    pub fn partition(trips: Vec<Trip>, today: NaiveDate) -> Self {
        let (upcoming, history) = trips.into_iter().partition(|trip| trip.is_upcoming(today));
        Self { upcoming, history }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripTransition {
    pub trip_id: Uuid,
    pub previous_status: TripStatus,
    pub status: TripStatus,
    pub driver: Option<AssignedDriver>,
}

/// Digits only; at least ten of them
pub fn normalize_phone(raw: &str) -> BookingResult<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return Err(BookingError::Validation(
            "phone must contain at least 10 digits".into(),
        ));
    }
    Ok(digits)
}

fn required(field: &str, value: &str) -> BookingResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BookingError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
