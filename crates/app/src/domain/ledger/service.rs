//! Ledger service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::ledger::{
        errors::LedgerServiceError,
        records::{NewTransaction, TransactionRecord, TransactionUuid},
        repository::PgLedgerRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgLedgerService {
    db: Db,
    repository: PgLedgerRepository,
}

impl PgLedgerService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgLedgerRepository::new(),
        }
    }
}

#[async_trait]
impl LedgerService for PgLedgerService {
    async fn record_transaction(
        &self,
        entry: NewTransaction,
    ) -> Result<TransactionRecord, LedgerServiceError> {
        let quantity = i32::try_from(entry.quantity)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .insert_transaction(&mut tx, TransactionUuid::new(), quantity, &entry)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, LedgerServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.list_transactions(&mut tx).await?;

        tx.commit().await?;

        Ok(records)
    }
}

#[automock]
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Append a completed sale. Entries are never updated or removed.
    async fn record_transaction(
        &self,
        entry: NewTransaction,
    ) -> Result<TransactionRecord, LedgerServiceError>;

    /// All entries, newest first.
    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, LedgerServiceError>;
}
