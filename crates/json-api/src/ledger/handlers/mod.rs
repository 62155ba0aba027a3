//! Ledger Handlers

pub(crate) mod index;
