//! Referral accounts, attribution and rewards

pub mod errors;
pub mod generator;
pub mod records;
mod repository;
pub mod service;

pub use errors::ReferralsServiceError;
pub use generator::*;
pub use service::*;
