//! State

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use wakatv_app::context::AppContext;

/// Shared handler state injected into every request.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self { app })
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("State").finish_non_exhaustive()
    }
}
