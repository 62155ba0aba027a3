//! Referral Errors

use salvo::http::StatusError;
use tracing::error;

use wakatv_app::domain::referrals::ReferralsServiceError;

pub(crate) fn into_status_error(error: ReferralsServiceError) -> StatusError {
    match error {
        ReferralsServiceError::NotFound => {
            StatusError::not_found().brief("No referral account for this email")
        }
        ReferralsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid referral lookup")
        }
        ReferralsServiceError::AlreadyExists
        | ReferralsServiceError::CodeSpaceExhausted { .. }
        | ReferralsServiceError::Sql(_) => {
            error!("referral lookup failed: {error}");

            StatusError::internal_server_error()
        }
    }
}
