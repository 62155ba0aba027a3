//! Ledger Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::ledger::records::{NewTransaction, TransactionRecord, TransactionUuid};

const INSERT_TRANSACTION_SQL: &str = include_str!("sql/insert_transaction.sql");
const LIST_TRANSACTIONS_SQL: &str = include_str!("sql/list_transactions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLedgerRepository;

impl PgLedgerRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: TransactionUuid,
        quantity: i32,
        entry: &NewTransaction,
    ) -> Result<TransactionRecord, sqlx::Error> {
        query_as::<Postgres, TransactionRecord>(INSERT_TRANSACTION_SQL)
            .bind(uuid.into_uuid())
            .bind(&entry.email)
            .bind(quantity)
            .bind(&entry.reference)
            .bind(SqlxTimestamp::from(entry.recorded_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_transactions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        query_as::<Postgres, TransactionRecord>(LIST_TRANSACTIONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for TransactionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            uuid: TransactionUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            quantity: u32::try_from(quantity).map_err(|error| sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(error),
            })?,
            reference: row.try_get("reference")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
