//! Admin session tokens.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Prefix that makes leaked session tokens easy to spot.
pub const SESSION_TOKEN_PREFIX: &str = "wk_adm_";

pub const SESSION_SECRET_BYTES: usize = 32;

/// A bearer token as handed to the operator. Zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0_u8; SESSION_SECRET_BYTES];

        OsRng.fill_bytes(&mut secret);

        let token = Self(format!("{SESSION_TOKEN_PREFIX}{}", encode_hex(&secret)));

        secret.zeroize();

        token
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key under which the session is stored; the raw token is never kept.
    #[must_use]
    pub fn digest(&self) -> SessionDigest {
        SessionDigest::of(&self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(**redacted**)")
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionDigest([u8; 32]);

impl SessionDigest {
    #[must_use]
    pub fn of(token: &str) -> Self {
        Self(Sha256::digest(token.as_bytes()).into())
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
