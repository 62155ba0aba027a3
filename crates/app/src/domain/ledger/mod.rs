//! Append-only transaction ledger

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::LedgerServiceError;
pub use service::*;
