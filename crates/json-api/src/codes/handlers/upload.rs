//! Upload Codes Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use wakatv_app::domain::codes::data::CodeUpload;

use crate::{codes::into_status_error, extensions::*, state::State};

/// Upload Codes Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UploadCodesRequest {
    /// Raw codes; surrounding whitespace, blanks and repeats are ignored
    pub codes: Vec<String>,
}

/// Upload Codes Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UploadCodesResponse {
    /// Distinct non-blank codes in the request
    pub received: usize,

    /// Codes that were new to the inventory
    pub inserted: u64,
}

/// Upload Codes Handler
///
/// Adds codes to the inventory. Codes already present are left untouched, so
/// re-uploading a file is harmless.
#[endpoint(
    tags("admin"),
    summary = "Upload Codes",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Codes stored"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<UploadCodesRequest>,
    depot: &mut Depot,
) -> Result<Json<UploadCodesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.admin_identity_or_401()?;

    let summary = state
        .app
        .codes
        .upload_codes(CodeUpload {
            codes: json.into_inner().codes,
        })
        .await
        .map_err(into_status_error)?;

    info!(
        username = %identity.username,
        received = summary.received,
        inserted = summary.inserted,
        "codes uploaded"
    );

    Ok(Json(UploadCodesResponse {
        received: summary.received,
        inserted: summary.inserted,
    }))
}
