//! Referrals Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::referrals::records::{ReferralAccountRecord, ReferralAccountUuid};

const FIND_ACCOUNT_BY_EMAIL_SQL: &str = include_str!("sql/find_account_by_email.sql");
const LOCK_ACCOUNT_BY_CODE_SQL: &str = include_str!("sql/lock_account_by_code.sql");
const REFERRAL_CODE_EXISTS_SQL: &str = include_str!("sql/referral_code_exists.sql");
const INSERT_ACCOUNT_SQL: &str = include_str!("sql/insert_account.sql");
const INSERT_REFERRAL_SQL: &str = include_str!("sql/insert_referral.sql");
const COUNT_REFERRALS_SQL: &str = include_str!("sql/count_referrals.sql");
const TOUCH_ACCOUNT_SQL: &str = include_str!("sql/touch_account.sql");
const INCREMENT_REWARDS_SQL: &str = include_str!("sql/increment_rewards.sql");

/// Referrer row held under `FOR UPDATE` for the rest of the transaction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LockedReferrer {
    pub(crate) uuid: ReferralAccountUuid,
    pub(crate) email: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReferralsRepository;

impl PgReferralsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_account_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<ReferralAccountRecord>, sqlx::Error> {
        query_as::<Postgres, ReferralAccountRecord>(FIND_ACCOUNT_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn referral_code_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(REFERRAL_CODE_EXISTS_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert an account unless one already exists for `email`.
    ///
    /// Returns `false` when the email was taken. A clash on the referral code
    /// surfaces as a unique-violation error.
    pub(crate) async fn insert_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        referral_code: &str,
        created_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(INSERT_ACCOUNT_SQL)
            .bind(Uuid::now_v7())
            .bind(email)
            .bind(referral_code)
            .bind(SqlxTimestamp::from(created_at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn lock_account_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referral_code: &str,
    ) -> Result<Option<LockedReferrer>, sqlx::Error> {
        let row = query(LOCK_ACCOUNT_BY_CODE_SQL)
            .bind(referral_code)
            .fetch_optional(&mut **tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(LockedReferrer {
            uuid: ReferralAccountUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
        }))
    }

    /// Returns `false` if the referee was already credited to this referrer.
    pub(crate) async fn insert_referral(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referrer: ReferralAccountUuid,
        referee_email: &str,
        created_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(INSERT_REFERRAL_SQL)
            .bind(referrer.into_uuid())
            .bind(referee_email)
            .bind(SqlxTimestamp::from(created_at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn count_referrals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referrer: ReferralAccountUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_REFERRALS_SQL)
            .bind(referrer.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn touch_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account: ReferralAccountUuid,
        updated_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_ACCOUNT_SQL)
            .bind(account.into_uuid())
            .bind(SqlxTimestamp::from(updated_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn increment_rewards(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        updated_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(INCREMENT_REWARDS_SQL)
            .bind(email)
            .bind(SqlxTimestamp::from(updated_at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ReferralAccountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let rewards_earned: i32 = row.try_get("rewards_earned")?;

        Ok(Self {
            uuid: ReferralAccountUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            referral_code: row.try_get("referral_code")?,
            referred_emails: row.try_get("referred_emails")?,
            rewards_earned: u32::try_from(rewards_earned).map_err(|error| {
                sqlx::Error::ColumnDecode {
                    index: "rewards_earned".to_string(),
                    source: Box::new(error),
                }
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
