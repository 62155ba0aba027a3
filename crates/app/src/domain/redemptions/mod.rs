//! Redemption workflow: claim, deliver, record, credit referrals

pub mod data;
pub mod errors;
pub mod service;

pub use errors::{InvalidRedemption, RedemptionError};
pub use service::*;
