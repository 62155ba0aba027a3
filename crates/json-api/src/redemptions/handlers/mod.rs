//! Redemption Handlers

pub(crate) mod send;
