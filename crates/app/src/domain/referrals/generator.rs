//! Referral code minting.

use mockall::automock;
use rand::{Rng, rngs::OsRng, seq::SliceRandom};

/// Unambiguous upper-case alphabet: no `0`/`O`, `1`/`I`.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const DEFAULT_LENGTH: usize = 6;

#[automock]
pub trait ReferralCodeGenerator: Send + Sync {
    /// A fresh candidate code. Uniqueness is checked by the caller.
    fn generate(&self) -> String;
}

/// Draws codes from the operating system's random source.
#[derive(Debug, Clone, Copy)]
pub struct RandomReferralCodes {
    length: usize,
}

impl RandomReferralCodes {
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Draw a code from an arbitrary random source.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .filter_map(|_| ALPHABET.choose(&mut *rng))
            .map(|byte| char::from(*byte))
            .collect()
    }
}

impl Default for RandomReferralCodes {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

impl ReferralCodeGenerator for RandomReferralCodes {
    fn generate(&self) -> String {
        self.generate_with(&mut OsRng)
    }
}
