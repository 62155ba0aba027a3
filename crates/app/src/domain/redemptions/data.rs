//! Redemption Data

use std::time::Duration;

use crate::domain::{codes::records::CodeRecord, redemptions::errors::InvalidRedemption};

/// A purchase as received from the storefront, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    pub email: String,
    pub quantity: i64,
    pub reference: String,
    pub referral_code: Option<String>,
}

/// A request that passed validation, with every field normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRedemption {
    /// Lower-cased; the customer's identity.
    pub email: String,
    pub quantity: u32,
    pub reference: String,

    /// Upper-cased; `None` when absent or blank.
    pub referral_code: Option<String>,
}

impl RedemptionRequest {
    /// Normalise and check the request.
    ///
    /// # Errors
    ///
    /// Returns the first problem found with the request.
    pub fn validate(self) -> Result<ValidRedemption, InvalidRedemption> {
        let email = self.email.trim().to_lowercase();

        if email.is_empty() {
            return Err(InvalidRedemption::MissingEmail);
        }

        if !is_plausible_email(&email) {
            return Err(InvalidRedemption::InvalidEmail);
        }

        let quantity = u32::try_from(self.quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(InvalidRedemption::InvalidQuantity(self.quantity))?;

        let reference = self.reference.trim().to_string();

        if reference.is_empty() {
            return Err(InvalidRedemption::MissingReference);
        }

        let referral_code = self
            .referral_code
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());

        Ok(ValidRedemption {
            email,
            quantity,
            reference,
            referral_code,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Machine-readable terminal state of a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Complete,
    RejectedInsufficientInventory,
    InvalidRequest,
    FailedDelivery,
    FailedPersistence,
}

impl RedemptionOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::RejectedInsufficientInventory => "rejectedInsufficientInventory",
            Self::InvalidRequest => "invalidRequest",
            Self::FailedDelivery => "failedDelivery",
            Self::FailedPersistence => "failedPersistence",
        }
    }
}

/// What happened to the referral bonus for a credited referrer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusOutcome {
    /// The referred count is not a multiple of the reward threshold.
    NotDue,

    /// A bonus code was delivered.
    Granted { rewards_recorded: bool },

    /// No unused code was left for the bonus.
    Shortage,

    /// The bonus code could not be delivered and was returned to the pool.
    DeliveryFailed,

    Failed,
}

/// Referral attribution as seen by the requester's redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferralResult {
    NotRequested,
    Credited {
        referrer: String,
        referred_count: u64,
        bonus: BonusOutcome,
    },
    AlreadyReferred {
        referrer: String,
    },
    SelfReferral,
    UnknownCode,

    /// Attribution hit an error; the redemption still succeeded.
    Failed,
}

impl ReferralResult {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequested => "none",
            Self::Credited { .. } => "credited",
            Self::AlreadyReferred { .. } => "alreadyReferred",
            Self::SelfReferral => "selfReferral",
            Self::UnknownCode => "unknownCode",
            Self::Failed => "failed",
        }
    }
}

/// A completed redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    pub email: String,
    pub codes: Vec<CodeRecord>,

    /// The requester's own referral code.
    pub referral_code: String,

    /// `false` when the codes were delivered but the ledger append failed.
    pub ledger_recorded: bool,

    pub referral: ReferralResult,
}

impl Redemption {
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub const fn outcome(&self) -> RedemptionOutcome {
        RedemptionOutcome::Complete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionSettings {
    /// Upper bound on a single notifier call; expiry counts as a failed delivery.
    pub notify_timeout: Duration,

    /// A bonus is granted each time a referrer's count reaches a multiple of this.
    pub reward_threshold: u64,
}

impl Default for RedemptionSettings {
    fn default() -> Self {
        Self {
            notify_timeout: Duration::from_secs(30),
            reward_threshold: 5,
        }
    }
}
