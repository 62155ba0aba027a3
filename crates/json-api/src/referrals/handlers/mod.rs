//! Referral Handlers

pub(crate) mod get;
