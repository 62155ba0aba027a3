//! Redemption Config

use clap::Args;

/// Redemption workflow settings.
#[derive(Debug, Args)]
pub struct RedemptionConfig {
    /// Seconds to wait for the mail relay before a delivery counts as failed
    #[arg(long, env = "NOTIFY_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub notify_timeout_seconds: u64,

    /// Referrals needed per bonus code
    #[arg(
        long,
        env = "REFERRAL_REWARD_THRESHOLD",
        default_value_t = 5_u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub reward_threshold: u64,
}
