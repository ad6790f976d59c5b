use super::{collection_rate, status_map, StatusCount};
use chrono::{Duration, NaiveDate, NaiveTime};
use insurance_service::PayerType;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct DashboardTotals {
    pub total_trips: i64,
    pub trips_today: i64,
    pub active_patients: i64,
    pub active_drivers: i64,
    /// Active, available and inside their shift window right now
    pub drivers_available_now: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevenueTotals {
    pub total_billed: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
}

#[derive(Debug, FromRow)]
struct BilledPaid {
    total_billed: Decimal,
    total_paid: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub totals: DashboardTotals,
    pub revenue: RevenueTotals,
    pub claims_by_status: BTreeMap<String, i64>,
    pub trips_by_status: BTreeMap<String, i64>,
}

/// Live counts across trips, patients, drivers and claims
pub async fn dashboard(pool: &PgPool, today: NaiveDate, now: NaiveTime) -> sqlx::Result<Dashboard> {
    let totals = sqlx::query_as::<_, DashboardTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM operations.trips) AS total_trips,
            (SELECT COUNT(*) FROM operations.trips
              WHERE scheduled_pickup_time::date = $1) AS trips_today,
            (SELECT COUNT(*) FROM medical.patients WHERE status = 'active') AS active_patients,
            (SELECT COUNT(*) FROM operations.drivers WHERE status = 'active') AS active_drivers,
            (SELECT COUNT(*) FROM operations.drivers
              WHERE status = 'active'
                AND current_status = 'available'
                AND CASE WHEN shift_start <= shift_end
                         THEN $2 BETWEEN shift_start AND shift_end
                         ELSE $2 >= shift_start OR $2 <= shift_end
                    END) AS drivers_available_now
        "#,
    )
    .bind(today)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let billed = sqlx::query_as::<_, BilledPaid>(
        r#"
        SELECT COALESCE(SUM(total_amount), 0) AS total_billed,
               COALESCE(SUM(paid_amount), 0) AS total_paid
        FROM billing.claims
        "#,
    )
    .fetch_one(pool)
    .await?;

    let claims_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT claim_status AS status, COUNT(*) AS count FROM billing.claims GROUP BY claim_status",
    )
    .fetch_all(pool)
    .await?;

    let trips_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM operations.trips GROUP BY status",
    )
    .fetch_all(pool)
    .await?;

    Ok(Dashboard {
        totals,
        revenue: RevenueTotals {
            outstanding: billed.total_billed - billed.total_paid,
            total_billed: billed.total_billed,
            total_paid: billed.total_paid,
        },
        claims_by_status: status_map(claims_by_status),
        trips_by_status: status_map(trips_by_status),
    })
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct PayerRevenue {
    pub payer_type: String,
    pub claim_count: i64,
    pub total_billed: Decimal,
    pub total_paid: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub claims: i64,
    pub billed: Decimal,
    pub paid: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevenueReport {
    pub days: i64,
    pub by_payer: Vec<PayerRevenue>,
    /// Newest day first
    pub daily_trend: Vec<DailyRevenue>,
    pub total_billed: Decimal,
    pub total_paid: Decimal,
    /// Percent of billed collected
    pub collection_rate: Decimal,
}

/// Claims by payer type and by service date over the window
pub async fn revenue(pool: &PgPool, today: NaiveDate, days: i64) -> sqlx::Result<RevenueReport> {
    let since = today - Duration::days(days);

    let by_payer_sql = format!(
        r#"
        SELECT {payer} AS payer_type,
               COUNT(*) AS claim_count,
               COALESCE(SUM(c.total_amount), 0) AS total_billed,
               COALESCE(SUM(c.paid_amount), 0) AS total_paid
        FROM billing.claims c
        JOIN medical.patient_insurance pi ON pi.insurance_id = c.insurance_id
        WHERE c.service_date >= $1
        GROUP BY 1
        ORDER BY total_billed DESC
        "#,
        payer = PayerType::sql_label_case("pi.insurance_company"),
    );
    let by_payer = sqlx::query_as::<_, PayerRevenue>(&by_payer_sql)
        .bind(since)
        .fetch_all(pool)
        .await?;

    let daily_trend = sqlx::query_as::<_, DailyRevenue>(
        r#"
        SELECT service_date AS date,
               COUNT(*) AS claims,
               COALESCE(SUM(total_amount), 0) AS billed,
               COALESCE(SUM(paid_amount), 0) AS paid
        FROM billing.claims
        WHERE service_date >= $1
        GROUP BY service_date
        ORDER BY service_date DESC
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let total_billed: Decimal = by_payer.iter().map(|p| p.total_billed).sum();
    let total_paid: Decimal = by_payer.iter().map(|p| p.total_paid).sum();

    Ok(RevenueReport {
        days,
        by_payer,
        daily_trend,
        total_billed,
        total_paid,
        collection_rate: collection_rate(total_paid, total_billed),
    })
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub total_trips: i64,
    pub assigned: i64,
    pub unassigned: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct DriverUtilization {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub trips: i64,
    pub current_status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct HourlyVolume {
    /// Hour of day, 0 to 23
    pub hour: i32,
    pub trips: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OperationsReport {
    pub days: i64,
    pub daily_volume: Vec<DailyVolume>,
    pub trips_by_status: BTreeMap<String, i64>,
    pub driver_utilization: Vec<DriverUtilization>,
    /// Busiest pickup hours first
    pub peak_hours: Vec<HourlyVolume>,
}

pub async fn operations(pool: &PgPool, today: NaiveDate, days: i64) -> sqlx::Result<OperationsReport> {
    let since = today - Duration::days(days);

    let daily_volume = sqlx::query_as::<_, DailyVolume>(
        r#"
        SELECT trip_date AS date,
               COUNT(*) AS total_trips,
               COUNT(driver_id) AS assigned,
               COUNT(*) - COUNT(driver_id) AS unassigned
        FROM operations.trips
        WHERE trip_date >= $1
        GROUP BY trip_date
        ORDER BY trip_date DESC
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let trips_by_status = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM operations.trips
        WHERE trip_date >= $1
        GROUP BY status
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let driver_utilization = sqlx::query_as::<_, DriverUtilization>(
        r#"
        SELECT d.driver_id,
               d.first_name || ' ' || d.last_name AS driver_name,
               COUNT(t.trip_id) AS trips,
               d.current_status
        FROM operations.drivers d
        LEFT JOIN operations.trips t
               ON t.driver_id = d.driver_id AND t.trip_date >= $1
        WHERE d.status = 'active'
        GROUP BY d.driver_id
        ORDER BY trips DESC, driver_name
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let peak_hours = sqlx::query_as::<_, HourlyVolume>(
        r#"
        SELECT EXTRACT(HOUR FROM scheduled_pickup_time)::INT AS hour,
               COUNT(*) AS trips
        FROM operations.trips
        WHERE trip_date >= $1
        GROUP BY 1
        ORDER BY trips DESC, hour
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(OperationsReport {
        days,
        daily_volume,
        trips_by_status: status_map(trips_by_status),
        driver_utilization,
        peak_hours,
    })
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct InsuranceMix {
    /// Payer label, or `Uninsured` without active primary coverage
    pub insurance_type: String,
    pub patients: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct TopPatient {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub trip_count: i64,
    pub last_trip_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct MonthlyRegistrations {
    pub year: i32,
    pub month: i32,
    pub patients: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientsReport {
    pub total_active: i64,
    pub by_insurance: Vec<InsuranceMix>,
    pub top_patients: Vec<TopPatient>,
    /// Last six months, newest first
    pub new_patients: Vec<MonthlyRegistrations>,
}

/// Maximum rows in the most-frequent-riders list
const TOP_PATIENTS: i64 = 10;

pub async fn patients(pool: &PgPool) -> sqlx::Result<PatientsReport> {
    let total_active: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM medical.patients WHERE status = 'active'")
            .fetch_one(pool)
            .await?;

    let mix_sql = format!(
        r#"
        SELECT CASE WHEN pi.insurance_id IS NULL THEN 'Uninsured' ELSE {payer} END AS insurance_type,
               COUNT(*) AS patients
        FROM medical.patients p
        LEFT JOIN medical.patient_insurance pi
               ON pi.patient_id = p.patient_id AND pi.is_primary AND pi.status = 'active'
        WHERE p.status = 'active'
        GROUP BY 1
        ORDER BY patients DESC
        "#,
        payer = PayerType::sql_label_case("pi.insurance_company"),
    );
    let by_insurance = sqlx::query_as::<_, InsuranceMix>(&mix_sql)
        .fetch_all(pool)
        .await?;

    let top_patients = sqlx::query_as::<_, TopPatient>(
        r#"
        SELECT p.patient_id,
               p.first_name || ' ' || p.last_name AS patient_name,
               COUNT(t.trip_id) AS trip_count,
               MAX(t.trip_date) AS last_trip_date
        FROM medical.patients p
        JOIN operations.trips t ON t.patient_id = p.patient_id
        GROUP BY p.patient_id
        ORDER BY trip_count DESC, last_trip_date DESC
        LIMIT $1
        "#,
    )
    .bind(TOP_PATIENTS)
    .fetch_all(pool)
    .await?;

    let new_patients = sqlx::query_as::<_, MonthlyRegistrations>(
        r#"
        SELECT EXTRACT(YEAR FROM created_at)::INT AS year,
               EXTRACT(MONTH FROM created_at)::INT AS month,
               COUNT(*) AS patients
        FROM medical.patients
        WHERE created_at >= NOW() - INTERVAL '6 months'
        GROUP BY 1, 2
        ORDER BY 1 DESC, 2 DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(PatientsReport {
        total_active,
        by_insurance,
        top_patients,
        new_patients,
    })
}
