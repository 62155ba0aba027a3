//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    admin::{AdminAuthService, AdminCredentials, InMemoryAdminAuthService},
    clock::{Clock, SystemClock},
    database::{self, Db},
    domain::{
        codes::{CodesService, PgCodesService},
        ledger::{LedgerService, PgLedgerService},
        redemptions::{RedemptionWorkflow, RedemptionsService, data::RedemptionSettings},
        referrals::{PgReferralsService, RandomReferralCodes, ReferralsService},
    },
    notifications::{NotifierError, SmtpNotifier, SmtpSettings},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("failed to configure mail transport")]
    Notifier(#[source] NotifierError),
}

/// Everything needed to build the services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub smtp: SmtpSettings,
    pub admin: AdminCredentials,
    pub admin_session_ttl: Duration,
    pub redemption: RedemptionSettings,
}

#[derive(Clone)]
pub struct AppContext {
    pub codes: Arc<dyn CodesService>,
    pub ledger: Arc<dyn LedgerService>,
    pub referrals: Arc<dyn ReferralsService>,
    pub redemptions: Arc<dyn RedemptionsService>,
    pub admin: Arc<dyn AdminAuthService>,
}

impl AppContext {
    /// Connect to the database, apply migrations and wire the services together.
    ///
    /// # Errors
    ///
    /// Returns an error when the database is unreachable, a migration fails or the
    /// mail settings are invalid.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database_url, config.max_connections)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        let notifier = SmtpNotifier::new(&config.smtp).map_err(AppInitError::Notifier)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let db = Db::new(pool);

        let codes: Arc<dyn CodesService> = Arc::new(PgCodesService::new(db.clone()));
        let ledger: Arc<dyn LedgerService> = Arc::new(PgLedgerService::new(db.clone()));
        let referrals: Arc<dyn ReferralsService> = Arc::new(PgReferralsService::new(
            db,
            Arc::new(RandomReferralCodes::default()),
            clock.clone(),
        ));

        let redemptions = Arc::new(RedemptionWorkflow::new(
            codes.clone(),
            ledger.clone(),
            referrals.clone(),
            Arc::new(notifier),
            clock.clone(),
            config.redemption,
        ));

        let admin = Arc::new(InMemoryAdminAuthService::new(
            config.admin.clone(),
            config.admin_session_ttl,
            clock,
        ));

        Ok(Self {
            codes,
            ledger,
            referrals,
            redemptions,
            admin,
        })
    }
}
