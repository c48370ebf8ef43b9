//! SQLite ledger backed by an `sqlx` pool
//!
//! Amounts are kept as decimal TEXT and summed in Rust, so aggregates are
//! exact. Timestamps are kept as RFC 3339 TEXT with their original offset.

use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use velocity_core::{CalendarDay, DailyAggregate, IsoWeek, LedgerEntry, WeeklyAggregate};

use crate::error::{StoreError, StoreResult};
use crate::store::LedgerStore;

/// Durable ledger stored in a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Open (or create) the database at `url`, e.g. `sqlite:velocity.db`
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let ledger = Self::from_pool(pool);
        ledger.init().await?;
        Ok(ledger)
    }

    /// Private in-memory database (for testing)
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool
    /// is pinned to a single connection that never expires.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let ledger = Self::from_pool(pool);
        ledger.init().await?;
        Ok(ledger)
    }

    /// Wrap a caller-owned pool. Call [`SqliteLedger::init`] before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                attempt_id INTEGER NOT NULL,
                customer_id INTEGER NOT NULL,
                load_amount TEXT NOT NULL,
                occurred_at TEXT NOT NULL,
                iso_year INTEGER NOT NULL,
                iso_week INTEGER NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                day INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_entries_day
            ON ledger_entries(customer_id, year, month, day)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_entries_week
            ON ledger_entries(customer_id, iso_year, iso_week)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_entries_attempt
            ON ledger_entries(customer_id, attempt_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("Ledger schema initialized");
        Ok(())
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for open connections to finish
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Total number of entries
    pub async fn len(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|_| StoreError::corrupt("COUNT(*)", count.to_string()))
    }

    /// All entries for one customer, in append order
    pub async fn entries_for(&self, customer_id: u64) -> StoreResult<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT attempt_id, customer_id, load_amount, occurred_at,
                   iso_year, iso_week, year, month, day
            FROM ledger_entries
            WHERE customer_id = ?
            ORDER BY id
            "#,
        )
        .bind(to_sql_id("customer_id", customer_id)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn daily_aggregate(
        &self,
        customer_id: u64,
        day: CalendarDay,
    ) -> StoreResult<DailyAggregate> {
        let amounts: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT load_amount FROM ledger_entries
            WHERE customer_id = ? AND year = ? AND month = ? AND day = ?
            "#,
        )
        .bind(to_sql_id("customer_id", customer_id)?)
        .bind(day.year)
        .bind(i64::from(day.month))
        .bind(i64::from(day.day))
        .fetch_all(&self.pool)
        .await?;

        let amounts = amounts
            .iter()
            .map(|a| parse_amount(a))
            .collect::<StoreResult<Vec<_>>>()?;
        DailyAggregate::from_amounts(amounts).ok_or(StoreError::Overflow { customer_id })
    }

    async fn weekly_aggregate(
        &self,
        customer_id: u64,
        week: IsoWeek,
    ) -> StoreResult<WeeklyAggregate> {
        let amounts: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT load_amount FROM ledger_entries
            WHERE customer_id = ? AND iso_year = ? AND iso_week = ?
            "#,
        )
        .bind(to_sql_id("customer_id", customer_id)?)
        .bind(week.iso_year)
        .bind(i64::from(week.iso_week))
        .fetch_all(&self.pool)
        .await?;

        let amounts = amounts
            .iter()
            .map(|a| parse_amount(a))
            .collect::<StoreResult<Vec<_>>>()?;
        WeeklyAggregate::from_amounts(amounts).ok_or(StoreError::Overflow { customer_id })
    }

    async fn append(&self, entry: &LedgerEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (attempt_id, customer_id, load_amount, occurred_at,
                 iso_year, iso_week, year, month, day)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(to_sql_id("attempt_id", entry.attempt_id)?)
        .bind(to_sql_id("customer_id", entry.customer_id)?)
        .bind(entry.load_amount.to_string())
        .bind(entry.occurred_at.to_rfc3339())
        .bind(entry.iso_year)
        .bind(i64::from(entry.iso_week))
        .bind(entry.year)
        .bind(i64::from(entry.month))
        .bind(i64::from(entry.day))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn contains_attempt(&self, customer_id: u64, attempt_id: u64) -> StoreResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM ledger_entries WHERE customer_id = ? AND attempt_id = ? LIMIT 1",
        )
        .bind(to_sql_id("customer_id", customer_id)?)
        .bind(to_sql_id("attempt_id", attempt_id)?)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }
}

/// SQLite integers are signed 64-bit
fn to_sql_id(field: &'static str, value: u64) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::OutOfRange { field, value })
}

fn parse_amount(value: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value).map_err(|_| StoreError::corrupt("load_amount", value))
}

fn get_id(row: &SqliteRow, column: &'static str) -> StoreResult<u64> {
    let value: i64 = row.try_get(column)?;
    u64::try_from(value).map_err(|_| StoreError::corrupt(column, value.to_string()))
}

fn get_u32(row: &SqliteRow, column: &'static str) -> StoreResult<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| StoreError::corrupt(column, value.to_string()))
}

fn row_to_entry(row: &SqliteRow) -> StoreResult<LedgerEntry> {
    let load_amount: String = row.try_get("load_amount")?;
    let occurred_at: String = row.try_get("occurred_at")?;
    let occurred_at = DateTime::parse_from_rfc3339(&occurred_at)
        .map_err(|_| StoreError::corrupt("occurred_at", occurred_at.as_str()))?;

    Ok(LedgerEntry {
        attempt_id: get_id(row, "attempt_id")?,
        customer_id: get_id(row, "customer_id")?,
        load_amount: parse_amount(&load_amount)?,
        occurred_at,
        iso_year: row.try_get("iso_year")?,
        iso_week: get_u32(row, "iso_week")?,
        year: row.try_get("year")?,
        month: get_u32(row, "month")?,
        day: get_u32(row, "day")?,
    })
}
