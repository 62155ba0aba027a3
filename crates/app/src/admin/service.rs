//! Admin auth service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use dashmap::DashMap;
use jiff::Timestamp;
use mockall::automock;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::{
    admin::{
        errors::AdminAuthError,
        token::{SessionDigest, SessionToken},
    },
    clock::Clock,
};

/// Operator credentials from configuration.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,

    /// An empty password disables login.
    pub password: Zeroizing<String>,
}

impl Debug for AdminCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: SessionToken,
    pub expires_at: Timestamp,
}

/// The operator behind a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub username: String,
    pub expires_at: Timestamp,
}

/// Sessions kept in process memory, keyed by token digest.
pub struct InMemoryAdminAuthService {
    credentials: AdminCredentials,
    ttl: Duration,
    sessions: DashMap<SessionDigest, AdminIdentity>,
    clock: Arc<dyn Clock>,
}

impl InMemoryAdminAuthService {
    #[must_use]
    pub fn new(credentials: AdminCredentials, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        if credentials.password.is_empty() {
            warn!("admin password is empty, admin login is disabled");
        }

        Self {
            credentials,
            ttl,
            sessions: DashMap::new(),
            clock,
        }
    }

    fn credentials_match(&self, username: &str, password: &str) -> bool {
        let username_ok = digests_match(username, &self.credentials.username);
        let password_ok = digests_match(password, &self.credentials.password);

        username_ok & password_ok
    }

    fn prune_expired(&self, now: Timestamp) {
        self.sessions.retain(|_, identity| identity.expires_at > now);
    }
}

impl Debug for InMemoryAdminAuthService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InMemoryAdminAuthService")
            .field("credentials", &self.credentials)
            .field("ttl", &self.ttl)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

/// Hash both sides first so the comparison length never depends on the input.
fn digests_match(provided: &str, expected: &str) -> bool {
    constant_time_eq(
        &Sha256::digest(provided.as_bytes()),
        &Sha256::digest(expected.as_bytes()),
    )
}

#[async_trait]
impl AdminAuthService for InMemoryAdminAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<AdminSession, AdminAuthError> {
        if self.credentials.password.is_empty() {
            return Err(AdminAuthError::LoginDisabled);
        }

        if !self.credentials_match(username, password) {
            warn!(username, "admin login rejected");

            return Err(AdminAuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(Timestamp::MAX);

        self.prune_expired(now);

        let token = SessionToken::generate();

        self.sessions.insert(
            token.digest(),
            AdminIdentity {
                username: self.credentials.username.clone(),
                expires_at,
            },
        );

        info!(username, %expires_at, "admin session issued");

        Ok(AdminSession { token, expires_at })
    }

    async fn authenticate(&self, token: &str) -> Result<AdminIdentity, AdminAuthError> {
        let digest = SessionDigest::of(token);
        let now = self.clock.now();

        let identity = self
            .sessions
            .get(&digest)
            .map(|entry| entry.value().clone())
            .ok_or(AdminAuthError::InvalidToken)?;

        if identity.expires_at <= now {
            self.sessions.remove(&digest);

            return Err(AdminAuthError::Expired);
        }

        Ok(identity)
    }

    async fn logout(&self, token: &str) -> Result<(), AdminAuthError> {
        self.sessions
            .remove(&SessionDigest::of(token))
            .map(|_| ())
            .ok_or(AdminAuthError::InvalidToken)
    }
}

#[automock]
#[async_trait]
pub trait AdminAuthService: Send + Sync {
    /// Check operator credentials and open a session.
    async fn login(&self, username: &str, password: &str) -> Result<AdminSession, AdminAuthError>;

    /// Resolve a bearer token to the operator it was issued to.
    async fn authenticate(&self, token: &str) -> Result<AdminIdentity, AdminAuthError>;

    /// Revoke a session.
    async fn logout(&self, token: &str) -> Result<(), AdminAuthError>;
}
