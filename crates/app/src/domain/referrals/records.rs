//! Referral Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

pub type ReferralAccountUuid = TypedUuid<ReferralAccountRecord>;

/// Per-customer referral state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferralAccountRecord {
    pub uuid: ReferralAccountUuid,
    pub email: String,
    pub referral_code: String,

    /// Customers credited to this account, oldest first.
    pub referred_emails: Vec<String>,

    pub rewards_earned: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of crediting a referee to the owner of a referral code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferralAttribution {
    /// The referee was added; `referred_count` includes them.
    Credited {
        referrer: String,
        referred_count: u64,
    },

    /// The referee was already in the referrer's set; nothing changed.
    AlreadyReferred {
        referrer: String,
        referred_count: u64,
    },

    /// The code belongs to the referee.
    SelfReferral,

    UnknownCode,
}
