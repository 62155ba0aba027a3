//! Get Referral Account Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use wakatv_app::domain::referrals::records::ReferralAccountRecord;

use crate::{extensions::*, referrals::into_status_error, state::State};

/// Referral Account Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReferralAccountResponse {
    pub email: String,

    /// Code to share with friends
    pub referral_code: String,

    pub referred_count: usize,
    pub rewards_earned: u32,
}

impl From<ReferralAccountRecord> for ReferralAccountResponse {
    fn from(account: ReferralAccountRecord) -> Self {
        Self {
            email: account.email,
            referral_code: account.referral_code,
            referred_count: account.referred_emails.len(),
            rewards_earned: account.rewards_earned,
        }
    }
}

/// Get Referral Account Handler
///
/// Shown on the storefront referral page. The account only exists once the
/// customer has completed a purchase.
#[endpoint(
    tags("referrals"),
    summary = "Get Referral Account",
    responses(
        (status_code = StatusCode::OK, description = "Referral account"),
        (status_code = StatusCode::NOT_FOUND, description = "No account for this email"),
    ),
)]
pub(crate) async fn handler(
    email: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<ReferralAccountResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let email = email.into_inner().trim().to_lowercase();

    let account = state
        .app
        .referrals
        .find_account(&email)
        .await
        .map_err(into_status_error)?;

    Ok(Json(account.into()))
}
