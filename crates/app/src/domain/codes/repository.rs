//! Codes Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::codes::records::{CodeRecord, CodeUuid};

const CLAIM_CODES_SQL: &str = include_str!("sql/claim_codes.sql");
const CLAIM_CODES_WAITING_SQL: &str = include_str!("sql/claim_codes_waiting.sql");
const RELEASE_CODES_SQL: &str = include_str!("sql/release_codes.sql");
const INSERT_CODES_SQL: &str = include_str!("sql/insert_codes.sql");
const LIST_CODES_SQL: &str = include_str!("sql/list_codes.sql");
const COUNT_UNUSED_CODES_SQL: &str = include_str!("sql/count_unused_codes.sql");
const DELETE_CODES_SQL: &str = include_str!("sql/delete_codes.sql");

/// How a claim treats unused rows another transaction currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClaimLocking {
    /// Pass over held rows.
    SkipLocked,

    /// Block until the holder commits or rolls back, then re-check the row.
    Wait,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCodesRepository;

impl PgCodesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Mark up to `limit` unused codes as used by `customer` in a single statement.
    ///
    /// Either locking mode leaves two transactions unable to return the same code. With
    /// [`ClaimLocking::SkipLocked`] a short result may only mean the rows were busy.
    pub(crate) async fn claim_unused(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: &str,
        limit: i64,
        claimed_at: Timestamp,
        locking: ClaimLocking,
    ) -> Result<Vec<CodeRecord>, sqlx::Error> {
        let sql = match locking {
            ClaimLocking::SkipLocked => CLAIM_CODES_SQL,
            ClaimLocking::Wait => CLAIM_CODES_WAITING_SQL,
        };

        query_as::<Postgres, CodeRecord>(sql)
            .bind(limit)
            .bind(customer)
            .bind(SqlxTimestamp::from(claimed_at))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn release(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: &str,
        codes: &[CodeUuid],
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = codes.iter().map(|code| code.into_uuid()).collect();

        let rows_affected = query(RELEASE_CODES_SQL)
            .bind(uuids)
            .bind(customer)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn insert_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        codes: Vec<String>,
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = codes.iter().map(|_| Uuid::now_v7()).collect();

        let rows_affected = query(INSERT_CODES_SQL)
            .bind(uuids)
            .bind(codes)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        unused_only: bool,
    ) -> Result<Vec<CodeRecord>, sqlx::Error> {
        query_as::<Postgres, CodeRecord>(LIST_CODES_SQL)
            .bind(unused_only)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_unused(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_UNUSED_CODES_SQL)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        codes: &[CodeUuid],
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = codes.iter().map(|code| code.into_uuid()).collect();

        let rows_affected = query(DELETE_CODES_SQL)
            .bind(uuids)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CodeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            used: row.try_get("used")?,
            used_by: row.try_get("used_by")?,
            used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
