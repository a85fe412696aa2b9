use anyhow::Result;
use sqlx::{
    migrate::MigrateDatabase, pool::PoolConnection, sqlite::SqlitePoolOptions, Sqlite, SqlitePool,
    Transaction,
};
use std::sync::Arc;
use tracing::info;

/// DbConnection manages the SQLite pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (and create if needed) the database at `url`
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open an isolated in-memory database.
    ///
    /// A single connection is kept for the whole lifetime of the pool so the
    /// in-memory database is never dropped between queries.
    pub async fn init_test() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a database transaction.
    ///
    /// Domain writes and their linked ledger writes go through the same
    /// transaction so neither is visible without the other.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Acquire a plain connection for single-statement writes
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
        self.pool.acquire().await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visit_payments (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                patient_name TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                method TEXT NOT NULL CHECK (method IN ('Cash', 'Card', 'Transfer')),
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_visit_payments_date
            ON visit_payments(date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                vendor TEXT,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                method TEXT NOT NULL CHECK (method IN ('Cash', 'Card', 'Transfer')),
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_date
            ON expenses(date);
            "#,
        )
        .execute(pool)
        .await?;

        // The CHECK constraints mirror LedgerRecord::from_parts: at most one
        // owner reference, and the kind is fixed by which reference is set.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_records (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                description TEXT,
                source_visit_payment_id TEXT,
                source_expense_id TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                CHECK (
                    (kind = 'Income' AND source_visit_payment_id IS NOT NULL AND source_expense_id IS NULL)
                    OR (kind = 'Expense' AND source_expense_id IS NOT NULL AND source_visit_payment_id IS NULL)
                    OR (kind = 'ManualDeposit' AND source_visit_payment_id IS NULL AND source_expense_id IS NULL)
                )
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_records_date
            ON ledger_records(date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_records_visit_payment
            ON ledger_records(source_visit_payment_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_records_expense
            ON ledger_records(source_expense_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
