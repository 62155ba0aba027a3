//! Admin Logout Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    admin::{into_status_error, middleware::bearer_token},
    extensions::*,
    state::State,
};

/// Admin Logout Handler
///
/// Revokes the presented session token.
#[endpoint(
    tags("admin"),
    summary = "Admin Logout",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Session revoked"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unknown session"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.admin_identity_or_401()?;

    let token = bearer_token(req).ok_or_else(StatusError::unauthorized)?;

    state
        .app
        .admin
        .logout(token)
        .await
        .map_err(into_status_error)?;

    info!(username = %identity.username, "admin logged out");

    Ok(StatusCode::NO_CONTENT)
}
