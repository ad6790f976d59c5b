use crate::accounts::find_or_create_patient;
use crate::error::{BookingError, BookingResult};
use crate::hours::BusinessHours;
use crate::identifiers::{trip_number, MAX_ATTEMPTS};
use crate::matching::{DriverMatcher, ShiftWindow};
use crate::models::{
    AssignedDriver, BookingOutcome, BookingRequest, DriverCandidate, NewAccount, Trip,
    TripRequest, TripSchedule, TripStatus, TripTransition,
};
use chrono::{NaiveDate, NaiveTime};
use database_layer::{DatabasePool, TransactionManager};
use sqlx::{FromRow, PgConnection};
use tracing::{info, warn};
use uuid::Uuid;

const TRIP_COLUMNS: &str = "trip_id, trip_number, patient_id, driver_id, trip_date, pickup_time, \
     appointment_time, pickup_address, dropoff_address, status, trip_type, \
     special_instructions, created_at, completed_at";

/// Locked trip row for a status transition
#[derive(Debug, FromRow)]
struct TripLock {
    status: String,
    driver_id: Option<Uuid>,
    trip_date: NaiveDate,
    pickup_time: NaiveTime,
}

#[derive(Debug, FromRow)]
struct DriverLock {
    first_name: String,
    last_name: String,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
    current_status: String,
    status: String,
}

/// Booking service
#[derive(Clone)]
pub struct BookingService {
    pub(crate) pool: DatabasePool,
    pub(crate) transactions: TransactionManager,
    hours: BusinessHours,
    matcher: DriverMatcher,
}

impl BookingService {
    /// Create a new booking service with the standard business hours
    pub fn new(pool: DatabasePool) -> Self {
        Self::with_hours(pool, BusinessHours::default())
    }

    pub fn with_hours(pool: DatabasePool, hours: BusinessHours) -> Self {
        Self {
            transactions: TransactionManager::new(pool.clone()),
            pool,
            hours,
            matcher: DriverMatcher,
        }
    }

    /// Book a trip from the public form
    ///
    /// The patient is matched by phone or created with portal credentials.
    /// Patient, trip and driver assignment commit together or not at all.
    pub async fn book(&self, request: BookingRequest, today: NaiveDate) -> BookingResult<BookingOutcome> {
        let patient = request.patient.validate()?;
        let schedule = request.trip.schedule(&self.hours, today)?;

        let mut tx = self.transactions.begin().await?;
        let (patient_id, account) = find_or_create_patient(&mut tx, &patient, today).await?;
        let outcome = self
            .create_trip(&mut tx, patient_id, account, &schedule, today)
            .await?;
        tx.commit().await?;

        info!(
            trip_id = %outcome.trip_id,
            trip_number = %outcome.trip_number,
            phone = %logger_redacted::mask_identifier(&patient.phone),
            new_patient = outcome.is_new_patient,
            assigned = outcome.driver.is_some(),
            "Trip booked"
        );
        Ok(outcome)
    }

    /// Book a trip for a known patient
    pub async fn book_for_patient(
        &self,
        patient_id: Uuid,
        request: TripRequest,
        today: NaiveDate,
    ) -> BookingResult<BookingOutcome> {
        let schedule = request.schedule(&self.hours, today)?;

        let mut tx = self.transactions.begin().await?;
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT patient_id FROM medical.patients WHERE patient_id = $1")
                .bind(patient_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(BookingError::PatientNotFound(patient_id));
        }

        let outcome = self
            .create_trip(&mut tx, patient_id, None, &schedule, today)
            .await?;
        tx.commit().await?;

        info!(
            trip_id = %outcome.trip_id,
            patient_id = %patient_id,
            assigned = outcome.driver.is_some(),
            "Trip booked from portal"
        );
        Ok(outcome)
    }

    async fn create_trip(
        &self,
        conn: &mut PgConnection,
        patient_id: Uuid,
        account: Option<NewAccount>,
        schedule: &TripSchedule,
        today: NaiveDate,
    ) -> BookingResult<BookingOutcome> {
        let mut created = None;
        for _ in 0..MAX_ATTEMPTS {
            let number = trip_number(today);
            let inserted: Option<Uuid> = sqlx::query_scalar(
                r#"
                INSERT INTO operations.trips
                    (trip_number, patient_id, trip_date, pickup_time, appointment_time,
                     scheduled_pickup_time, pickup_address, dropoff_address, status,
                     trip_type, special_instructions)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (trip_number) DO NOTHING
                RETURNING trip_id
                "#,
            )
            .bind(&number)
            .bind(patient_id)
            .bind(schedule.trip_date)
            .bind(schedule.pickup_time)
            .bind(schedule.appointment_time)
            .bind(schedule.scheduled_pickup())
            .bind(&schedule.pickup_address)
            .bind(&schedule.dropoff_address)
            .bind(TripStatus::Scheduled.as_str())
            .bind(schedule.trip_type.as_str())
            .bind(schedule.special_instructions.as_deref())
            .fetch_optional(&mut *conn)
            .await?;

            if let Some(trip_id) = inserted {
                created = Some((trip_id, number));
                break;
            }
        }
        let (trip_id, trip_number) = created.ok_or(BookingError::NumberExhausted("trip number"))?;

        let driver = self.match_driver(conn, trip_id, schedule).await?;
        let status = if driver.is_some() {
            TripStatus::Assigned
        } else {
            TripStatus::Scheduled
        };

        Ok(BookingOutcome {
            patient_id,
            is_new_patient: account.is_some(),
            account,
            trip_id,
            trip_number,
            trip_date: schedule.trip_date,
            pickup_time: schedule.pickup_time,
            status,
            driver,
        })
    }

    /// Best-effort automatic assignment
    ///
    /// Candidates are row-locked with `SKIP LOCKED`, so a driver being
    /// assigned by a concurrent booking is simply not considered.
    async fn match_driver(
        &self,
        conn: &mut PgConnection,
        trip_id: Uuid,
        schedule: &TripSchedule,
    ) -> BookingResult<Option<AssignedDriver>> {
        let candidates = sqlx::query_as::<_, DriverCandidate>(
            r#"
            SELECT d.driver_id, d.first_name, d.last_name, d.shift_start, d.shift_end, d.rating,
                   (SELECT COUNT(*) FROM operations.trips t
                    WHERE t.driver_id = d.driver_id
                      AND t.trip_date = $1
                      AND t.status <> 'cancelled') AS trips_that_day
            FROM operations.drivers d
            WHERE d.status = 'active' AND d.current_status = 'available'
            FOR UPDATE OF d SKIP LOCKED
            "#,
        )
        .bind(schedule.trip_date)
        .fetch_all(&mut *conn)
        .await?;

        let Some(driver) = self.matcher.select(&candidates, schedule.pickup_time) else {
            warn!(
                trip_id = %trip_id,
                candidates = candidates.len(),
                "No driver available; trip left for manual dispatch"
            );
            return Ok(None);
        };

        assign(conn, trip_id, driver.driver_id).await?;
        Ok(Some(AssignedDriver {
            driver_id: driver.driver_id,
            driver_name: driver.display_name(),
        }))
    }

    /// Assign a specific driver to a scheduled trip
    pub async fn assign_driver(&self, trip_id: Uuid, driver_id: Uuid) -> BookingResult<TripTransition> {
        let mut tx = self.transactions.begin().await?;
        let trip = lock_trip(&mut tx, trip_id).await?;
        let previous = parse_status(&trip.status)?;
        if !previous.can_assign() {
            return Err(BookingError::InvalidTransition {
                from: previous,
                action: "assign",
            });
        }

        let driver = sqlx::query_as::<_, DriverLock>(
            r#"
            SELECT first_name, last_name, shift_start, shift_end, current_status, status
            FROM operations.drivers
            WHERE driver_id = $1
            FOR UPDATE
            "#,
        )
        .bind(driver_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::DriverNotFound(driver_id))?;

        if driver.status != "active" || driver.current_status != "available" {
            return Err(BookingError::DriverUnavailable {
                driver_id,
                reason: format!("driver is {}", driver.current_status),
            });
        }
        if !ShiftWindow::new(driver.shift_start, driver.shift_end).contains(trip.pickup_time) {
            return Err(BookingError::DriverUnavailable {
                driver_id,
                reason: format!(
                    "pickup at {} on {} is outside the {}-{} shift",
                    trip.pickup_time.format("%H:%M"),
                    trip.trip_date,
                    driver.shift_start.format("%H:%M"),
                    driver.shift_end.format("%H:%M")
                ),
            });
        }

        assign(&mut tx, trip_id, driver_id).await?;
        tx.commit().await?;

        info!(trip_id = %trip_id, driver_id = %driver_id, "Driver assigned manually");
        Ok(TripTransition {
            trip_id,
            previous_status: previous,
            status: TripStatus::Assigned,
            driver: Some(AssignedDriver {
                driver_id,
                driver_name: format!("{} {}", driver.first_name, driver.last_name),
            }),
        })
    }

    /// Mark an assigned trip completed and free its driver
    pub async fn complete_trip(&self, trip_id: Uuid) -> BookingResult<TripTransition> {
        self.close_trip(trip_id, TripStatus::Completed, "complete", TripStatus::can_complete)
            .await
    }

    /// Cancel an open trip and free its driver
    pub async fn cancel_trip(&self, trip_id: Uuid) -> BookingResult<TripTransition> {
        self.close_trip(trip_id, TripStatus::Cancelled, "cancel", TripStatus::can_cancel)
            .await
    }

    async fn close_trip(
        &self,
        trip_id: Uuid,
        to: TripStatus,
        action: &'static str,
        allowed: fn(TripStatus) -> bool,
    ) -> BookingResult<TripTransition> {
        let mut tx = self.transactions.begin().await?;
        let trip = lock_trip(&mut tx, trip_id).await?;
        let previous = parse_status(&trip.status)?;
        if !allowed(previous) {
            return Err(BookingError::InvalidTransition { from: previous, action });
        }

        sqlx::query(
            r#"
            UPDATE operations.trips
            SET status = $2,
                completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE trip_id = $1
            "#,
        )
        .bind(trip_id)
        .bind(to.as_str())
        .execute(&mut *tx)
        .await?;

        if let Some(driver_id) = trip.driver_id {
            sqlx::query(
                "UPDATE operations.drivers SET current_status = 'available' WHERE driver_id = $1",
            )
            .bind(driver_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(trip_id = %trip_id, from = %previous, to = %to, "Trip closed");
        Ok(TripTransition {
            trip_id,
            previous_status: previous,
            status: to,
            driver: None,
        })
    }

    /// Scheduled trips with no driver, earliest pickup first
    pub async fn unassigned_trips(&self) -> BookingResult<Vec<Trip>> {
        let query = format!(
            "SELECT {TRIP_COLUMNS} FROM operations.trips \
             WHERE driver_id IS NULL AND status = 'scheduled' \
             ORDER BY trip_date, pickup_time"
        );
        Ok(sqlx::query_as::<_, Trip>(&query)
            .fetch_all(self.pool.pool())
            .await?)
    }

    pub async fn get_trip(&self, trip_id: Uuid) -> BookingResult<Trip> {
        let query = format!("SELECT {TRIP_COLUMNS} FROM operations.trips WHERE trip_id = $1");
        sqlx::query_as::<_, Trip>(&query)
            .bind(trip_id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(BookingError::TripNotFound(trip_id))
    }

    /// All trips of one patient, newest first
    pub async fn patient_trips(&self, patient_id: Uuid) -> BookingResult<Vec<Trip>> {
        let query = format!(
            "SELECT {TRIP_COLUMNS} FROM operations.trips \
             WHERE patient_id = $1 ORDER BY trip_date DESC, pickup_time DESC"
        );
        Ok(sqlx::query_as::<_, Trip>(&query)
            .bind(patient_id)
            .fetch_all(self.pool.pool())
            .await?)
    }
}

async fn lock_trip(conn: &mut PgConnection, trip_id: Uuid) -> BookingResult<TripLock> {
    sqlx::query_as::<_, TripLock>(
        r#"
        SELECT status, driver_id, trip_date, pickup_time
        FROM operations.trips
        WHERE trip_id = $1
        FOR UPDATE
        "#,
    )
    .bind(trip_id)
    .fetch_optional(conn)
    .await?
    .ok_or(BookingError::TripNotFound(trip_id))
}

/// Point the trip at the driver and take the driver off the available pool
async fn assign(conn: &mut PgConnection, trip_id: Uuid, driver_id: Uuid) -> BookingResult<()> {
    sqlx::query(
        r#"
        UPDATE operations.trips
        SET driver_id = $2, status = 'assigned', updated_at = NOW()
        WHERE trip_id = $1
        "#,
    )
    .bind(trip_id)
    .bind(driver_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE operations.drivers SET current_status = 'assigned' WHERE driver_id = $1")
        .bind(driver_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn parse_status(raw: &str) -> BookingResult<TripStatus> {
    raw.parse().map_err(BookingError::Validation)
}
