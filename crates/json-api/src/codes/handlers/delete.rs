//! Delete Codes Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{codes::into_status_error, extensions::*, state::State};

/// Delete Codes Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeleteCodesRequest {
    pub uuids: Vec<Uuid>,
}

/// Delete Codes Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeleteCodesResponse {
    /// Codes actually removed; unknown identifiers are skipped
    pub deleted: u64,
}

/// Delete Codes Handler
#[endpoint(
    tags("admin"),
    summary = "Delete Codes",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    json: JsonBody<DeleteCodesRequest>,
    depot: &mut Depot,
) -> Result<Json<DeleteCodesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.admin_identity_or_401()?;

    let uuids = json.into_inner().uuids.into_iter().map(Into::into).collect();

    let deleted = state
        .app
        .codes
        .delete_codes(uuids)
        .await
        .map_err(into_status_error)?;

    info!(username = %identity.username, deleted, "codes deleted");

    Ok(Json(DeleteCodesResponse { deleted }))
}
