//! Codes service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::codes::{
        data::{CodeClaim, CodeFilter, CodeRelease, CodeUpload, UploadSummary},
        errors::CodesServiceError,
        records::{CodeRecord, CodeUuid},
        repository::{ClaimLocking, PgCodesRepository},
    },
};

/// Blocking claims to attempt while committed stock still covers the request.
const WAITING_CLAIM_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct PgCodesService {
    db: Db,
    repository: PgCodesRepository,
}

impl PgCodesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCodesRepository::new(),
        }
    }

    /// Claims all of `claim.quantity` codes in one transaction, or rolls back and yields `None`.
    async fn try_claim(
        &self,
        claim: &CodeClaim,
        locking: ClaimLocking,
    ) -> Result<Option<Vec<CodeRecord>>, CodesServiceError> {
        let mut tx = self.db.begin().await?;

        let claimed = self
            .repository
            .claim_unused(
                &mut tx,
                &claim.customer,
                i64::from(claim.quantity),
                claim.claimed_at,
                locking,
            )
            .await?;

        if claimed.len() < claim.quantity as usize {
            tx.rollback().await?;

            return Ok(None);
        }

        tx.commit().await?;

        Ok(Some(claimed))
    }
}

#[async_trait]
impl CodesService for PgCodesService {
    async fn claim_codes(&self, claim: CodeClaim) -> Result<Vec<CodeRecord>, CodesServiceError> {
        if claim.quantity == 0 {
            return Err(CodesServiceError::InvalidQuantity);
        }

        if let Some(claimed) = self.try_claim(&claim, ClaimLocking::SkipLocked).await? {
            return Ok(claimed);
        }

        // Skipped rows may belong to a claim that is about to roll back.
        for _ in 0..WAITING_CLAIM_ATTEMPTS {
            if let Some(claimed) = self.try_claim(&claim, ClaimLocking::Wait).await? {
                return Ok(claimed);
            }

            if self.count_unused().await? < u64::from(claim.quantity) {
                break;
            }
        }

        let available = u32::try_from(self.count_unused().await?).unwrap_or(u32::MAX);

        debug!(
            customer = %claim.customer,
            requested = claim.quantity,
            available,
            "claim refused, inventory short"
        );

        Err(CodesServiceError::InsufficientInventory {
            requested: claim.quantity,
            available,
        })
    }

    async fn release_codes(&self, release: CodeRelease) -> Result<u64, CodesServiceError> {
        if release.codes.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.begin().await?;

        let released = self
            .repository
            .release(&mut tx, &release.customer, &release.codes)
            .await?;

        tx.commit().await?;

        Ok(released)
    }

    async fn upload_codes(&self, upload: CodeUpload) -> Result<UploadSummary, CodesServiceError> {
        let codes = upload.normalised();
        let received = codes.len();

        if codes.is_empty() {
            return Ok(UploadSummary {
                received,
                inserted: 0,
            });
        }

        let mut tx = self.db.begin().await?;

        let inserted = self.repository.insert_codes(&mut tx, codes).await?;

        tx.commit().await?;

        info!(received, inserted, "codes uploaded");

        Ok(UploadSummary { received, inserted })
    }

    async fn list_codes(&self, filter: CodeFilter) -> Result<Vec<CodeRecord>, CodesServiceError> {
        let mut tx = self.db.begin().await?;

        let codes = self
            .repository
            .list_codes(&mut tx, filter == CodeFilter::Unused)
            .await?;

        tx.commit().await?;

        Ok(codes)
    }

    async fn count_unused(&self) -> Result<u64, CodesServiceError> {
        let mut tx = self.db.begin().await?;

        let count = self.repository.count_unused(&mut tx).await?;

        tx.commit().await?;

        u64::try_from(count).map_err(|_negative| CodesServiceError::InvalidData)
    }

    async fn delete_codes(&self, codes: Vec<CodeUuid>) -> Result<u64, CodesServiceError> {
        if codes.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.begin().await?;

        let deleted = self.repository.delete_codes(&mut tx, &codes).await?;

        tx.commit().await?;

        info!(requested = codes.len(), deleted, "codes deleted");

        Ok(deleted)
    }
}

#[automock]
#[async_trait]
pub trait CodesService: Send + Sync {
    /// Atomically claims exactly `claim.quantity` unused codes, or none at all.
    async fn claim_codes(&self, claim: CodeClaim) -> Result<Vec<CodeRecord>, CodesServiceError>;

    /// Returns claimed codes to the unused pool. Yields the number of codes released.
    async fn release_codes(&self, release: CodeRelease) -> Result<u64, CodesServiceError>;

    /// Inserts new unused codes, ignoring any that already exist.
    async fn upload_codes(&self, upload: CodeUpload) -> Result<UploadSummary, CodesServiceError>;

    /// Lists the inventory, newest first.
    async fn list_codes(&self, filter: CodeFilter) -> Result<Vec<CodeRecord>, CodesServiceError>;

    /// Number of codes still available.
    async fn count_unused(&self) -> Result<u64, CodesServiceError>;

    /// Deletes codes by identifier. Yields the number of codes removed.
    async fn delete_codes(&self, codes: Vec<CodeUuid>) -> Result<u64, CodesServiceError>;
}
