//! Redemption errors.

use thiserror::Error;

use crate::{
    domain::{
        codes::CodesServiceError, redemptions::data::RedemptionOutcome,
        referrals::ReferralsServiceError,
    },
    notifications::NotifierError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRedemption {
    #[error("email is required")]
    MissingEmail,

    #[error("email address is malformed")]
    InvalidEmail,

    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    #[error("payment reference is required")]
    MissingReference,
}

#[derive(Debug, Error)]
pub enum RedemptionError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRedemption),

    #[error("not enough codes in stock: requested {requested}, available {available}")]
    InsufficientInventory { requested: u32, available: u32 },

    /// The claimed codes were released before this was returned.
    #[error("failed to deliver codes")]
    DeliveryFailed(#[source] NotifierError),

    #[error("failed to load referral account")]
    Accounts(#[source] ReferralsServiceError),

    #[error("failed to claim codes")]
    Inventory(#[source] CodesServiceError),
}

impl RedemptionError {
    #[must_use]
    pub const fn outcome(&self) -> RedemptionOutcome {
        match self {
            Self::InvalidRequest(_) => RedemptionOutcome::InvalidRequest,
            Self::InsufficientInventory { .. } => RedemptionOutcome::RejectedInsufficientInventory,
            Self::DeliveryFailed(_) => RedemptionOutcome::FailedDelivery,
            Self::Accounts(_) | Self::Inventory(_) => RedemptionOutcome::FailedPersistence,
        }
    }
}
