//! Transaction Log Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wakatv_app::domain::ledger::records::TransactionRecord;

use crate::{extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionResponse {
    pub uuid: Uuid,
    pub email: String,
    pub quantity: u32,

    /// External payment reference
    pub reference: String,

    pub created_at: String,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            email: record.email,
            quantity: record.quantity,
            reference: record.reference,
            created_at: record.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TransactionLogResponse {
    /// Completed sales, newest first
    pub logs: Vec<TransactionResponse>,
}

/// Transaction Log Handler
#[endpoint(
    tags("admin"),
    summary = "List Transactions",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<TransactionLogResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let logs = state
        .app
        .ledger
        .list_transactions()
        .await
        .or_500("failed to load transaction log")?;

    Ok(Json(TransactionLogResponse {
        logs: logs.into_iter().map(Into::into).collect(),
    }))
}
