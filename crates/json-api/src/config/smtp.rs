//! SMTP Config

use std::fmt::{Debug, Formatter, Result as FmtResult};

use clap::Args;

/// Outbound mail relay settings.
#[derive(Args)]
pub struct SmtpConfig {
    /// SMTP relay host
    #[arg(id = "smtp_host", long = "smtp-host", env = "SMTP_HOST", default_value = "localhost")]
    pub host: String,

    /// SMTP relay port (STARTTLS)
    #[arg(id = "smtp_port", long = "smtp-port", env = "SMTP_PORT", default_value_t = 587_u16)]
    pub port: u16,

    /// SMTP username; leave unset for an unauthenticated relay
    #[arg(id = "smtp_username", long = "smtp-username", env = "SMTP_USERNAME")]
    pub username: Option<String>,

    /// SMTP password
    #[arg(
        id = "smtp_password",
        long = "smtp-password",
        env = "SMTP_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    pub password: String,

    /// Sender address on customer mail
    #[arg(long, env = "MAIL_FROM_ADDRESS", default_value = "no-reply@wakatv.example")]
    pub from_address: String,

    /// Sender display name
    #[arg(long, env = "MAIL_FROM_NAME", default_value = "WakaTV")]
    pub from_name: String,

    /// Help contact shown in customer mail
    #[arg(long, env = "SUPPORT_ADDRESS", default_value = "support@wakatv.example")]
    pub support_address: String,
}

impl Debug for SmtpConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("support_address", &self.support_address)
            .field("password", &"[redacted]")
            .finish()
    }
}
