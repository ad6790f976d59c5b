use super::{trips_per_driver, ActivityStatus, RECENT_ACTIVITY_DAYS};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;

/// Window covered by the summary KPI cards and revenue trend
pub const SUMMARY_DAYS: i64 = 30;

#[derive(Debug, FromRow)]
struct TripMetricTotals {
    completed_trips: i64,
    cancelled_trips: i64,
    total_revenue: Decimal,
    unique_patients: i64,
    on_time_rate: Decimal,
    average_trip_duration_minutes: Decimal,
}

#[derive(Debug, FromRow)]
struct FleetRow {
    vehicles_in_service: i32,
    total_vehicles: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KpiCards {
    /// Completed trips in the window
    pub total_trips: i64,
    pub total_revenue: Decimal,
    pub unique_patients: i64,
    /// Average daily on-time percentage, one decimal place
    pub on_time_rate: Decimal,
    pub completed_trips: i64,
    pub cancelled_trips: i64,
    pub average_trip_duration_minutes: Decimal,
    pub active_vehicles: i32,
    pub total_vehicles: i32,
    pub total_drivers: i32,
    pub avg_trips_per_driver: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    date: NaiveDate,
    trips: i64,
    revenue: Decimal,
    on_time_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub trips: i64,
    pub revenue: Decimal,
    pub on_time_pct: Decimal,
    pub status: ActivityStatus,
}

impl From<ActivityRow> for ActivityDay {
    fn from(row: ActivityRow) -> Self {
        Self {
            date: row.date,
            trips: row.trips,
            revenue: row.revenue.round_dp(2),
            on_time_pct: row.on_time_pct.round_dp(1),
            status: ActivityStatus::for_on_time(row.on_time_pct),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Summary {
    pub kpi: KpiCards,
    /// Oldest day first
    pub revenue_trend: Vec<RevenuePoint>,
    /// Newest day first
    pub recent_activity: Vec<ActivityDay>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WarehouseHealth {
    pub database: String,
    pub status: String,
}

pub async fn summary(pool: &PgPool, today: NaiveDate) -> sqlx::Result<Summary> {
    let since = today - Duration::days(SUMMARY_DAYS);

    let totals = sqlx::query_as::<_, TripMetricTotals>(
        r#"
        SELECT COALESCE(SUM(total_trips_completed), 0)::BIGINT AS completed_trips,
               COALESCE(SUM(total_trips_cancelled), 0)::BIGINT AS cancelled_trips,
               COALESCE(SUM(total_revenue), 0) AS total_revenue,
               COALESCE(SUM(unique_patients), 0)::BIGINT AS unique_patients,
               COALESCE(AVG(on_time_rate), 0) AS on_time_rate,
               COALESCE(AVG(average_trip_duration_minutes), 0) AS average_trip_duration_minutes
        FROM operational.daily_trip_metrics
        WHERE metric_date >= $1
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    let fleet = sqlx::query_as::<_, FleetRow>(
        r#"
        SELECT vehicles_in_service, total_vehicles
        FROM performance.fleet_performance_summary
        ORDER BY summary_date DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let total_drivers: i32 = sqlx::query_scalar(
        "SELECT active_drivers FROM performance.workforce_metrics ORDER BY metric_date DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?
    .unwrap_or(0);

    let revenue_trend = revenue_trend(pool, today, SUMMARY_DAYS).await?;

    let recent_activity = sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT metric_date AS date,
               COALESCE(SUM(total_trips_completed), 0)::BIGINT AS trips,
               COALESCE(SUM(total_revenue), 0) AS revenue,
               COALESCE(AVG(on_time_rate), 0) AS on_time_pct
        FROM operational.daily_trip_metrics
        GROUP BY metric_date
        ORDER BY metric_date DESC
        LIMIT $1
        "#,
    )
    .bind(RECENT_ACTIVITY_DAYS)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(ActivityDay::from)
    .collect();

    let (active_vehicles, total_vehicles) = fleet
        .map(|f| (f.vehicles_in_service, f.total_vehicles))
        .unwrap_or_default();

    Ok(Summary {
        kpi: KpiCards {
            total_trips: totals.completed_trips,
            total_revenue: totals.total_revenue.round_dp(2),
            unique_patients: totals.unique_patients,
            on_time_rate: totals.on_time_rate.round_dp(1),
            completed_trips: totals.completed_trips,
            cancelled_trips: totals.cancelled_trips,
            average_trip_duration_minutes: totals.average_trip_duration_minutes.round_dp(1),
            active_vehicles,
            total_vehicles,
            total_drivers,
            avg_trips_per_driver: trips_per_driver(totals.completed_trips, total_drivers),
        },
        revenue_trend,
        recent_activity,
    })
}

/// Daily warehouse revenue over the window, oldest first
pub async fn revenue_trend(pool: &PgPool, today: NaiveDate, days: i64) -> sqlx::Result<Vec<RevenuePoint>> {
    let points = sqlx::query_as::<_, RevenuePoint>(
        r#"
        SELECT metric_date AS date, COALESCE(SUM(total_revenue), 0) AS revenue
        FROM operational.daily_trip_metrics
        WHERE metric_date >= $1
        GROUP BY metric_date
        ORDER BY metric_date
        "#,
    )
    .bind(today - Duration::days(days))
    .fetch_all(pool)
    .await?;

    Ok(points
        .into_iter()
        .map(|p| RevenuePoint {
            revenue: p.revenue.round_dp(2),
            ..p
        })
        .collect())
}

/// Round-trip a trivial query against the warehouse
pub async fn ping(pool: &PgPool) -> sqlx::Result<WarehouseHealth> {
    let database: String = sqlx::query_scalar("SELECT current_database()::TEXT")
        .fetch_one(pool)
        .await?;
    Ok(WarehouseHealth {
        database,
        status: "connected".to_string(),
    })
}
