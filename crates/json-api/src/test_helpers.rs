//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use wakatv_app::{
    admin::{AdminIdentity, MockAdminAuthService},
    context::AppContext,
    domain::{
        codes::{
            MockCodesService,
            records::{CodeRecord, CodeUuid},
        },
        ledger::MockLedgerService,
        redemptions::MockRedemptionsService,
        referrals::MockReferralsService,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_ADMIN: &str = "admin";

/// Stand-in for the admin middleware on routes under test.
#[salvo::handler]
pub(crate) async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_admin_identity(AdminIdentity {
        username: TEST_ADMIN.to_string(),
        expires_at: Timestamp::MAX,
    });

    ctrl.call_next(req, depot, res).await;
}

/// Mocked services; any call without a configured expectation fails the test.
#[derive(Default)]
pub(crate) struct TestApp {
    pub(crate) codes: MockCodesService,
    pub(crate) ledger: MockLedgerService,
    pub(crate) referrals: MockReferralsService,
    pub(crate) redemptions: MockRedemptionsService,
    pub(crate) admin: MockAdminAuthService,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            codes: Arc::new(self.codes),
            ledger: Arc::new(self.ledger),
            referrals: Arc::new(self.referrals),
            redemptions: Arc::new(self.redemptions),
            admin: Arc::new(self.admin),
        })
    }

    /// Public route with state injected.
    pub(crate) fn service(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.state())).push(route))
    }

    /// Admin route with state and an authenticated operator injected.
    pub(crate) fn admin_service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.state()))
                .hoop(inject_admin)
                .push(route),
        )
    }
}

pub(crate) fn make_code(code: &str, used_by: Option<&str>) -> CodeRecord {
    CodeRecord {
        uuid: CodeUuid::new(),
        code: code.to_string(),
        used: used_by.is_some(),
        used_by: used_by.map(ToOwned::to_owned),
        used_at: used_by.map(|_| Timestamp::UNIX_EPOCH),
        created_at: Timestamp::UNIX_EPOCH,
    }
}
