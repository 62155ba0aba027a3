//! Referrals service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use sqlx::error::ErrorKind;
use tracing::{debug, info};

use crate::{
    clock::Clock,
    database::Db,
    domain::referrals::{
        errors::ReferralsServiceError,
        generator::ReferralCodeGenerator,
        records::{ReferralAccountRecord, ReferralAttribution},
        repository::PgReferralsRepository,
    },
};

/// Candidate codes tried before account creation gives up.
pub const MAX_CODE_ATTEMPTS: usize = 16;

#[derive(Clone)]
pub struct PgReferralsService {
    db: Db,
    repository: PgReferralsRepository,
    generator: Arc<dyn ReferralCodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl PgReferralsService {
    #[must_use]
    pub fn new(
        db: Db,
        generator: Arc<dyn ReferralCodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            repository: PgReferralsRepository::new(),
            generator,
            clock,
        }
    }
}

impl Debug for PgReferralsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgReferralsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|error| error.kind() == ErrorKind::UniqueViolation)
}

#[async_trait]
impl ReferralsService for PgReferralsService {
    async fn find_or_create_account(
        &self,
        email: &str,
    ) -> Result<ReferralAccountRecord, ReferralsServiceError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let mut tx = self.db.begin().await?;

            if let Some(account) = self.repository.find_account_by_email(&mut tx, email).await? {
                tx.commit().await?;

                return Ok(account);
            }

            let candidate = self.generator.generate();

            if self
                .repository
                .referral_code_exists(&mut tx, &candidate)
                .await?
            {
                tx.rollback().await?;

                debug!(attempt, "referral code collision, regenerating");

                continue;
            }

            let inserted = match self
                .repository
                .insert_account(&mut tx, email, &candidate, self.clock.now())
                .await
            {
                Ok(inserted) => inserted,
                Err(error) if is_unique_violation(&error) => {
                    // Lost a race for the same code; the transaction is aborted.
                    tx.rollback().await?;

                    debug!(attempt, "referral code taken concurrently, regenerating");

                    continue;
                }
                Err(error) => return Err(error.into()),
            };

            let account = self
                .repository
                .find_account_by_email(&mut tx, email)
                .await?
                .ok_or(ReferralsServiceError::NotFound)?;

            tx.commit().await?;

            if inserted {
                info!(
                    email,
                    referral_code = %account.referral_code,
                    "referral account created"
                );
            }

            return Ok(account);
        }

        Err(ReferralsServiceError::CodeSpaceExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    async fn find_account(
        &self,
        email: &str,
    ) -> Result<ReferralAccountRecord, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let account = self
            .repository
            .find_account_by_email(&mut tx, email)
            .await?
            .ok_or(ReferralsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(account)
    }

    async fn record_referral(
        &self,
        referral_code: &str,
        referee_email: &str,
    ) -> Result<ReferralAttribution, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        // Serialises attributions to the same referrer; other referrers are unaffected.
        let Some(referrer) = self
            .repository
            .lock_account_by_code(&mut tx, referral_code)
            .await?
        else {
            tx.rollback().await?;

            return Ok(ReferralAttribution::UnknownCode);
        };

        if referrer.email == referee_email {
            tx.rollback().await?;

            return Ok(ReferralAttribution::SelfReferral);
        }

        let now = self.clock.now();

        let credited = self
            .repository
            .insert_referral(&mut tx, referrer.uuid, referee_email, now)
            .await?;

        if credited {
            self.repository
                .touch_account(&mut tx, referrer.uuid, now)
                .await?;
        }

        let count = self.repository.count_referrals(&mut tx, referrer.uuid).await?;
        let referred_count =
            u64::try_from(count).map_err(|_negative| ReferralsServiceError::InvalidData)?;

        tx.commit().await?;

        Ok(if credited {
            ReferralAttribution::Credited {
                referrer: referrer.email,
                referred_count,
            }
        } else {
            ReferralAttribution::AlreadyReferred {
                referrer: referrer.email,
                referred_count,
            }
        })
    }

    async fn increment_rewards(
        &self,
        email: &str,
    ) -> Result<ReferralAccountRecord, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .increment_rewards(&mut tx, email, self.clock.now())
            .await?;

        if updated == 0 {
            tx.rollback().await?;

            return Err(ReferralsServiceError::NotFound);
        }

        let account = self
            .repository
            .find_account_by_email(&mut tx, email)
            .await?
            .ok_or(ReferralsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(account)
    }
}

#[automock]
#[async_trait]
pub trait ReferralsService: Send + Sync {
    /// Return the account for `email`, creating it with a fresh unique referral code if needed.
    async fn find_or_create_account(
        &self,
        email: &str,
    ) -> Result<ReferralAccountRecord, ReferralsServiceError>;

    async fn find_account(&self, email: &str)
    -> Result<ReferralAccountRecord, ReferralsServiceError>;

    /// Credit `referee_email` to the owner of `referral_code`.
    ///
    /// Idempotent: crediting the same referee twice reports
    /// [`ReferralAttribution::AlreadyReferred`] and changes nothing.
    async fn record_referral(
        &self,
        referral_code: &str,
        referee_email: &str,
    ) -> Result<ReferralAttribution, ReferralsServiceError>;

    /// Add one to the account's earned rewards.
    async fn increment_rewards(
        &self,
        email: &str,
    ) -> Result<ReferralAccountRecord, ReferralsServiceError>;
}
