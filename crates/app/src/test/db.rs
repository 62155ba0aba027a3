//! Per-test Postgres databases inside one shared container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

use crate::database::MIGRATOR;

const USER: &str = "wakatv_test";
const PASSWORD: &str = "wakatv_test_password";

static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

static DROP_QUEUE: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name(USER)
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn start_drop_queue() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("Failed to drop test database '{name}': {error}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> Option<String> {
    let container = CONTAINER.get()?;
    let port = container.get_host_port_ipv4(5432).await.ok()?;
    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    Some(format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}"))
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    let Some(url) = server_url("postgres").await else {
        return Ok(());
    };

    let mut conn = PgConnection::connect(&url).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// A freshly migrated database owned by a single test.
///
/// Dropping the handle queues the database for removal.
#[derive(Debug, Clone)]
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROP_QUEUE.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        DROP_QUEUE.get_or_init(start_drop_queue).await;
        CONTAINER.get_or_init(start_container).await;

        // Names are generated, never user supplied, so interpolating them is safe.
        let name = format!("wakatv_test_{}", Uuid::now_v7().simple());

        let admin_url = server_url("postgres")
            .await
            .expect("Failed to resolve container address");

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let url = server_url(&name)
            .await
            .expect("Failed to resolve container address");

        let pool = PgPool::connect(&url)
            .await
            .expect("Failed to create pool for test database");

        MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations on test database");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_schema() {
        let test_db = TestDb::new().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name <> '_sqlx_migrations' \
             ORDER BY table_name",
        )
        .fetch_all(test_db.pool())
        .await
        .expect("Failed to list tables");

        assert_eq!(
            tables,
            vec!["codes", "referral_accounts", "referrals", "transactions"],
            "unexpected schema after migrations"
        );
    }

    #[tokio::test]
    async fn databases_are_isolated() {
        let first = TestDb::new().await;
        let second = TestDb::new().await;

        sqlx::query("INSERT INTO codes (uuid, code) VALUES ($1, 'ONLY-IN-FIRST')")
            .bind(Uuid::now_v7())
            .execute(first.pool())
            .await
            .expect("Failed to insert code");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM codes")
            .fetch_one(second.pool())
            .await
            .expect("Failed to count codes");

        assert_eq!(count, 0, "second database should not see the first's rows");
    }
}
