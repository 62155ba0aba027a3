//! Code Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Code UUID
pub type CodeUuid = TypedUuid<CodeRecord>;

/// Code Record
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRecord {
    pub uuid: CodeUuid,

    /// The redeemable access code itself.
    pub code: String,

    pub used: bool,

    /// Customer the code was handed to.
    pub used_by: Option<String>,

    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
