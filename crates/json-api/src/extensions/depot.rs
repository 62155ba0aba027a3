//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use wakatv_app::admin::AdminIdentity;

const ADMIN_IDENTITY_DEPOT_KEY: &str = "admin_identity";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_admin_identity(&mut self, identity: AdminIdentity);

    /// The operator resolved by the admin middleware.
    fn admin_identity_or_401(&self) -> Result<&AdminIdentity, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_admin_identity(&mut self, identity: AdminIdentity) {
        self.insert(ADMIN_IDENTITY_DEPOT_KEY, identity);
    }

    fn admin_identity_or_401(&self) -> Result<&AdminIdentity, StatusError> {
        self.get::<AdminIdentity>(ADMIN_IDENTITY_DEPOT_KEY)
            .map_err(|_ignored| StatusError::unauthorized())
    }
}
