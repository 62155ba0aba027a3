//! Code Errors

use salvo::http::StatusError;
use tracing::error;

use wakatv_app::domain::codes::CodesServiceError;

pub(crate) fn into_status_error(error: CodesServiceError) -> StatusError {
    match error {
        CodesServiceError::AlreadyExists => StatusError::conflict().brief("Code already exists"),
        CodesServiceError::InvalidQuantity | CodesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid code payload")
        }
        CodesServiceError::InsufficientInventory {
            requested,
            available,
        } => StatusError::conflict().brief(format!(
            "Not enough codes: requested {requested}, available {available}"
        )),
        CodesServiceError::Sql(source) => {
            error!("code inventory storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
