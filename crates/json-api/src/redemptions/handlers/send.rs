//! Send Code Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use wakatv_app::domain::redemptions::{
    RedemptionError,
    data::{Redemption, RedemptionOutcome, RedemptionRequest},
};

use crate::{extensions::*, observability::observe_redemption, state::State};

/// Send Code Request
///
/// Missing fields and bodies that do not parse are both reported through the
/// `invalidRequest` outcome.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SendCodeRequest {
    pub email: String,
    pub quantity: i64,

    /// External payment reference
    pub reference: String,

    /// Referral code of the customer who referred this purchase
    pub referral_code: Option<String>,
}

impl From<SendCodeRequest> for RedemptionRequest {
    fn from(request: SendCodeRequest) -> Self {
        RedemptionRequest {
            email: request.email,
            quantity: request.quantity,
            reference: request.reference,
            referral_code: request.referral_code,
        }
    }
}

/// Send Code Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendCodeResponse {
    pub success: bool,

    /// Machine-readable result: `complete`, `invalidRequest`,
    /// `rejectedInsufficientInventory`, `failedDelivery` or `failedPersistence`
    pub outcome: String,

    /// Number of codes emailed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<usize>,

    /// The purchaser's own referral code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<Redemption> for SendCodeResponse {
    fn from(redemption: Redemption) -> Self {
        Self {
            success: true,
            outcome: redemption.outcome().as_str().to_owned(),
            delivered: Some(redemption.delivered()),
            referral_code: Some(redemption.referral_code),
            detail: None,
        }
    }
}

fn failure(outcome: RedemptionOutcome, detail: String) -> SendCodeResponse {
    SendCodeResponse {
        success: false,
        outcome: outcome.as_str().to_owned(),
        delivered: None,
        referral_code: None,
        detail: Some(detail),
    }
}

const fn status_for(outcome: RedemptionOutcome) -> StatusCode {
    match outcome {
        RedemptionOutcome::Complete => StatusCode::OK,
        RedemptionOutcome::InvalidRequest => StatusCode::BAD_REQUEST,
        RedemptionOutcome::RejectedInsufficientInventory => StatusCode::CONFLICT,
        RedemptionOutcome::FailedDelivery => StatusCode::BAD_GATEWAY,
        RedemptionOutcome::FailedPersistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn malformed_body() -> SendCodeResponse {
    failure(
        RedemptionOutcome::InvalidRequest,
        "Request body must be a JSON object with email, quantity and reference".to_string(),
    )
}

fn into_failure(error: &RedemptionError) -> SendCodeResponse {
    let outcome = error.outcome();

    let detail = match error {
        RedemptionError::InvalidRequest(invalid) => invalid.to_string(),
        RedemptionError::InsufficientInventory { .. } => {
            "Not enough codes in stock for this order".to_string()
        }
        RedemptionError::DeliveryFailed(_) => {
            "Could not email your codes; nothing was charged against stock".to_string()
        }
        RedemptionError::Accounts(_) | RedemptionError::Inventory(_) => {
            "Could not complete the order, please try again".to_string()
        }
    };

    failure(outcome, detail)
}

/// Send Code Handler
///
/// Claims codes for a paid order and emails them to the customer.
#[endpoint(
    tags("redemptions"),
    summary = "Send Access Codes",
    request_body = SendCodeRequest,
    responses(
        (status_code = StatusCode::OK, description = "Codes delivered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid request"),
        (status_code = StatusCode::CONFLICT, description = "Not enough codes in stock"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Codes could not be delivered"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Storage failure"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SendCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let (status, response) = match req.parse_json::<SendCodeRequest>().await {
        Err(error) => {
            warn!(
                outcome = RedemptionOutcome::InvalidRequest.as_str(),
                "redemption rejected, unreadable body: {error}"
            );

            (StatusCode::BAD_REQUEST, malformed_body())
        }
        Ok(request) => match state.app.redemptions.redeem(request.into()).await {
            Ok(redemption) => (StatusCode::OK, SendCodeResponse::from(redemption)),
            Err(error) => {
                let outcome = error.outcome();

                match outcome {
                    RedemptionOutcome::InvalidRequest
                    | RedemptionOutcome::RejectedInsufficientInventory => {
                        warn!(outcome = outcome.as_str(), "redemption rejected: {error}");
                    }
                    _ => error!(outcome = outcome.as_str(), "redemption failed: {error}"),
                }

                (status_for(outcome), into_failure(&error))
            }
        },
    };

    observe_redemption(&response.outcome);

    res.status_code(status);

    Ok(Json(response))
}
