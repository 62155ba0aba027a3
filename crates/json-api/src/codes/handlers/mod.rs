//! Code Handlers

pub(crate) mod delete;
pub(crate) mod index;
pub(crate) mod upload;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wakatv_app::domain::codes::records::CodeRecord;

/// Inventory entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodeResponse {
    pub uuid: Uuid,
    pub code: String,
    pub used: bool,

    /// Customer the code was delivered to
    pub used_by: Option<String>,

    pub used_at: Option<String>,
    pub created_at: String,
}

impl From<CodeRecord> for CodeResponse {
    fn from(record: CodeRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            code: record.code,
            used: record.used,
            used_by: record.used_by,
            used_at: record.used_at.map(|at| at.to_string()),
            created_at: record.created_at.to_string(),
        }
    }
}
