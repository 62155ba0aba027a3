//! Code Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use wakatv_app::domain::codes::data::CodeFilter;

use crate::{
    codes::{handlers::CodeResponse, into_status_error},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodesResponse {
    /// Inventory, newest first
    pub codes: Vec<CodeResponse>,

    /// Codes still available for sale
    pub unused_count: u64,
}

/// Code Index Handler
///
/// Lists the inventory, optionally only codes that have not been handed out.
#[endpoint(
    tags("admin"),
    summary = "List Codes",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    unused: QueryParam<bool, false>,
    depot: &mut Depot,
) -> Result<Json<CodesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let filter = if unused.into_inner().unwrap_or(false) {
        CodeFilter::Unused
    } else {
        CodeFilter::All
    };

    let codes = state
        .app
        .codes
        .list_codes(filter)
        .await
        .map_err(into_status_error)?;

    let unused_count = state
        .app
        .codes
        .count_unused()
        .await
        .map_err(into_status_error)?;

    Ok(Json(CodesResponse {
        codes: codes.into_iter().map(Into::into).collect(),
        unused_count,
    }))
}
