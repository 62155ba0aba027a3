//! Admin auth errors.

use salvo::http::StatusError;
use tracing::warn;

use wakatv_app::admin::AdminAuthError;

pub(crate) fn into_status_error(error: AdminAuthError) -> StatusError {
    match error {
        AdminAuthError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid username or password")
        }
        AdminAuthError::LoginDisabled => {
            warn!("admin login attempted while disabled");

            StatusError::forbidden().brief("Admin login is disabled")
        }
        AdminAuthError::InvalidToken => StatusError::unauthorized().brief("Invalid session token"),
        AdminAuthError::Expired => StatusError::unauthorized().brief("Session has expired"),
    }
}
