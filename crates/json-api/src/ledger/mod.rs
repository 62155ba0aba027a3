//! Transaction Ledger Admin

pub(crate) mod handlers;

pub(crate) use handlers::*;
