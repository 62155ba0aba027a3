//! Admin Config

use std::fmt::{Debug, Formatter, Result as FmtResult};

use clap::Args;

/// Operator login settings.
#[derive(Args)]
pub struct AdminConfig {
    /// Operator username
    #[arg(
        id = "admin_username",
        long = "admin-username",
        env = "ADMIN_USERNAME",
        default_value = "admin"
    )]
    pub username: String,

    /// Operator password; an empty value disables admin login
    #[arg(
        id = "admin_password",
        long = "admin-password",
        env = "ADMIN_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    pub password: String,

    /// Lifetime of an admin session in seconds
    #[arg(long, env = "ADMIN_SESSION_TTL_SECONDS", default_value_t = 43_200_u64)]
    pub session_ttl_seconds: u64,
}

impl Debug for AdminConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("password", &"[redacted]")
            .finish()
    }
}
