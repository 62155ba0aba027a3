//! Server configuration module

use std::time::Duration;

use clap::Parser;
use wakatv_app::{
    admin::AdminCredentials, context::AppConfig, domain::redemptions::data::RedemptionSettings,
    notifications::SmtpSettings,
};
use zeroize::Zeroizing;

use crate::config::{
    admin::AdminConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    redemption::RedemptionConfig,
    server::ServerRuntimeConfig,
    smtp::SmtpConfig,
};

pub(crate) mod admin;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod redemption;
pub(crate) mod server;
pub(crate) mod smtp;

/// WakaTV JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "wakatv-json", about = "WakaTV access code JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Outbound mail settings.
    #[command(flatten)]
    pub smtp: SmtpConfig,

    /// Operator login settings.
    #[command(flatten)]
    pub admin: AdminConfig,

    /// Redemption workflow tuning.
    #[command(flatten)]
    pub redemption: RedemptionConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings handed to the application context.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database.database_url.clone(),
            max_connections: self.database.max_connections,
            smtp: SmtpSettings {
                host: self.smtp.host.clone(),
                port: self.smtp.port,
                username: self.smtp.username.clone().filter(|name| !name.is_empty()),
                password: Zeroizing::new(self.smtp.password.clone()),
                from_address: self.smtp.from_address.clone(),
                from_name: self.smtp.from_name.clone(),
                support_address: self.smtp.support_address.clone(),
                timeout: Duration::from_secs(self.redemption.notify_timeout_seconds),
            },
            admin: AdminCredentials {
                username: self.admin.username.clone(),
                password: Zeroizing::new(self.admin.password.clone()),
            },
            admin_session_ttl: Duration::from_secs(self.admin.session_ttl_seconds),
            redemption: RedemptionSettings {
                notify_timeout: Duration::from_secs(self.redemption.notify_timeout_seconds),
                reward_threshold: self.redemption.reward_threshold,
            },
        }
    }
}
