//! Notifier errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("failed to build message")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport error")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}
