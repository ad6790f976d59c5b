use crate::auth::TokenService;
use crate::config::ServerConfig;
use billing_service::BillingService;
use booking_service::BookingService;
use database_layer::{DatabaseConfig, DatabasePool};
use insurance_service::InsuranceService;
use std::sync::Arc;
use tracing::info;

/// Main Transit server state
#[derive(Clone)]
pub struct TransitServer {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Operational database
    pub db: DatabasePool,
    /// Warehouse database for summary analytics; the operational pool when
    /// no separate warehouse is configured
    pub analytics_db: DatabasePool,
    pub booking: BookingService,
    pub insurance: InsuranceService,
    pub billing: BillingService,
    pub tokens: TokenService,
}

impl TransitServer {
    /// Connect the operational pool (and the warehouse pool when configured)
    pub async fn connect(config: ServerConfig) -> anyhow::Result<Self> {
        let mut database = DatabaseConfig::from_env()?;
        config.apply_pool_settings(&mut database);
        let db = DatabasePool::connect(&database).await?;

        let analytics_db = match config.analytics_database_url.as_deref() {
            Some(url) if !url.is_empty() => {
                let mut warehouse = DatabaseConfig::new(url);
                config.apply_pool_settings(&mut warehouse);
                info!("Using separate analytics warehouse database");
                DatabasePool::connect(&warehouse).await?
            }
            _ => db.clone(),
        };

        Ok(Self::from_pools(config, db, analytics_db))
    }

    /// Assemble state from existing pools
    pub fn from_pools(config: ServerConfig, db: DatabasePool, analytics_db: DatabasePool) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs);
        Self {
            booking: BookingService::new(db.clone()),
            insurance: InsuranceService::new(db.clone()),
            billing: BillingService::new(db.clone()),
            config: Arc::new(config),
            db,
            analytics_db,
            tokens,
        }
    }

    /// Today's date for business rules (server local calendar)
    pub fn today() -> chrono::NaiveDate {
        chrono::Local::now().date_naive()
    }
}
