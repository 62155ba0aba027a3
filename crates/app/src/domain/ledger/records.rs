//! Ledger Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

pub type TransactionUuid = TypedUuid<TransactionRecord>;

/// A completed sale as written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub uuid: TransactionUuid,
    pub email: String,
    pub quantity: u32,

    /// External payment reference, not unique.
    pub reference: String,

    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub email: String,
    pub quantity: u32,
    pub reference: String,
    pub recorded_at: Timestamp,
}
