//! SQLite storage backend using sqlx.
//!
//! Provides [`SqliteStore`], the [`TrackerStore`] used by the server binary,
//! backed by an embedded database file through `sqlx::SqlitePool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag (enabled by
//! default).
//!
//! # Schema
//!
//! Two tables, `credit_cards` and `statements`, joined by
//! `statements.card_id` with `ON DELETE CASCADE`. Calendar dates are stored
//! as `YYYY-MM-DD` text and timestamps as RFC 3339 text.
//!
//! The pool holds a single connection: SQLite allows one writer, and an
//! in-memory database only lives as long as its connection.

use crate::core::entity::{
    CardChanges, CreditCard, NewCard, NewStatement, NotificationKind, Statement,
};
use crate::core::lifecycle::PaymentSchedule;
use crate::core::store::TrackerStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// Also upgrades `statements` tables created before payment scheduling
/// existed by adding the `reviewed_at` and `scheduled_payment_date` columns.
/// Existing rows get NULL in both.
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS credit_cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            last_four TEXT NOT NULL,
            statement_day INTEGER NOT NULL,
            days_until_due INTEGER NOT NULL,
            credit_limit REAL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create credit_cards table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS statements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id INTEGER NOT NULL,
            statement_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            amount REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            notified_statement BOOLEAN NOT NULL DEFAULT 0,
            notified_payment BOOLEAN NOT NULL DEFAULT 0,
            reviewed_at DATETIME,
            scheduled_payment_date TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (card_id) REFERENCES credit_cards(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create statements table: {}", e))?;

    for (name, sql) in [
        (
            "idx_statements_card_id",
            "CREATE INDEX IF NOT EXISTS idx_statements_card_id ON statements(card_id)",
        ),
        (
            "idx_statements_status",
            "CREATE INDEX IF NOT EXISTS idx_statements_status ON statements(status)",
        ),
        (
            "idx_statements_due_date",
            "CREATE INDEX IF NOT EXISTS idx_statements_due_date ON statements(due_date)",
        ),
    ] {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| anyhow!("Failed to create index {}: {}", name, e))?;
    }

    add_column_if_missing(pool, "statements", "reviewed_at", "DATETIME").await?;
    add_column_if_missing(pool, "statements", "scheduled_payment_date", "TEXT").await?;

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await
            .map_err(|e| anyhow!("Failed to inspect columns of {}: {}", table, e))?;
    Ok(count > 0)
}

/// `table`, `column` and `definition` are compile-time constants; they are
/// interpolated because DDL cannot take bind parameters.
async fn add_column_if_missing(
    pool: &SqlitePool,
    table: &'static str,
    column: &'static str,
    definition: &'static str,
) -> Result<()> {
    if has_column(pool, table, column).await? {
        return Ok(());
    }

    tracing::info!(table, column, "migrating: adding column");
    sqlx::query(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition))
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to add column {}.{}: {}", table, column, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const CARD_COLUMNS: &str =
    "id, name, last_four, statement_day, days_until_due, credit_limit, created_at, updated_at";

const STATEMENT_COLUMNS: &str = "id, card_id, statement_date, due_date, amount, status, \
     notified_statement, notified_payment, reviewed_at, scheduled_payment_date, \
     created_at, updated_at";

impl<'r> FromRow<'r, SqliteRow> for CreditCard {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let statement_day: i64 = row.try_get("statement_day")?;
        Ok(CreditCard {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            last_four: row.try_get("last_four")?,
            statement_day: u32::try_from(statement_day).map_err(|e| sqlx::Error::ColumnDecode {
                index: "statement_day".to_string(),
                source: Box::new(e),
            })?,
            days_until_due: row.try_get("days_until_due")?,
            credit_limit: row.try_get("credit_limit")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Statement {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let reviewed_at: Option<DateTime<Utc>> = row.try_get("reviewed_at")?;
        let scheduled_payment_date: Option<NaiveDate> = row.try_get("scheduled_payment_date")?;
        // a half-written pair is treated as unscheduled
        let schedule = match (reviewed_at, scheduled_payment_date) {
            (Some(reviewed_at), Some(scheduled_payment_date)) => Some(PaymentSchedule {
                reviewed_at,
                scheduled_payment_date,
            }),
            _ => None,
        };

        Ok(Statement {
            id: row.try_get("id")?,
            card_id: row.try_get("card_id")?,
            statement_date: row.try_get("statement_date")?,
            due_date: row.try_get("due_date")?,
            amount: row.try_get("amount")?,
            status: row.try_get("status")?,
            notified_statement: row.try_get("notified_statement")?,
            notified_payment: row.try_get("notified_payment")?,
            schedule,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Tracker storage backed by SQLite
///
/// # Example
///
/// ```rust,ignore
/// use card_tracker::storage::SqliteStore;
///
/// let store = SqliteStore::open("./credit_cards.db").await?;
/// let cards = store.list_cards().await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. The schema is not touched.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file at `path` and apply the schema
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| anyhow!("Failed to open database {}: {}", path.display(), e))?;

        ensure_schema(&pool).await?;
        tracing::info!(path = %path.display(), "database ready");
        Ok(Self { pool })
    }

    /// A private in-memory database, gone when the store is dropped
    pub async fn in_memory() -> Result<Self> {
        let pool = memory_pool().await?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| anyhow!("Invalid in-memory database options: {}", e))?
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| anyhow!("Failed to open in-memory database: {}", e))
}

#[async_trait]
impl TrackerStore for SqliteStore {
    async fn list_cards(&self) -> Result<Vec<CreditCard>> {
        let sql = format!("SELECT {} FROM credit_cards ORDER BY name", CARD_COLUMNS);
        sqlx::query_as::<_, CreditCard>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to list cards: {}", e))
    }

    async fn get_card(&self, id: i64) -> Result<Option<CreditCard>> {
        let sql = format!("SELECT {} FROM credit_cards WHERE id = ?", CARD_COLUMNS);
        sqlx::query_as::<_, CreditCard>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to get card: {}", e))
    }

    async fn create_card(&self, card: NewCard) -> Result<CreditCard> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO credit_cards \
             (name, last_four, statement_day, days_until_due, credit_limit, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&card.name)
        .bind(&card.last_four)
        .bind(i64::from(card.cycle.statement_day))
        .bind(card.cycle.days_until_due)
        .bind(card.credit_limit)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to create card: {}", e))?;

        Ok(card.into_card(result.last_insert_rowid(), now))
    }

    async fn update_card(&self, id: i64, changes: &CardChanges) -> Result<Option<CreditCard>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        let sql = format!("SELECT {} FROM credit_cards WHERE id = ?", CARD_COLUMNS);
        let Some(mut card) = sqlx::query_as::<_, CreditCard>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to load card for update: {}", e))?
        else {
            return Ok(None);
        };

        card.apply_changes(changes, Utc::now());

        let result = sqlx::query(
            "UPDATE credit_cards \
             SET name = ?, last_four = ?, statement_day = ?, days_until_due = ?, \
                 credit_limit = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&card.name)
        .bind(&card.last_four)
        .bind(i64::from(card.statement_day))
        .bind(card.days_until_due)
        .bind(card.credit_limit)
        .bind(card.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| anyhow!("Failed to update card: {}", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit card update: {}", e))?;
        Ok(Some(card))
    }

    async fn delete_card(&self, id: i64) -> Result<Option<u64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        let statements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM statements WHERE card_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to count statements: {}", e))?;

        let result = sqlx::query("DELETE FROM credit_cards WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to delete card: {}", e))?;

        // dropping the transaction rolls it back
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit card deletion: {}", e))?;
        Ok(Some(statements as u64))
    }

    async fn list_statements(&self) -> Result<Vec<Statement>> {
        let sql = format!(
            "SELECT {} FROM statements ORDER BY due_date DESC",
            STATEMENT_COLUMNS
        );
        sqlx::query_as::<_, Statement>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to list statements: {}", e))
    }

    async fn get_statement(&self, id: i64) -> Result<Option<Statement>> {
        let sql = format!("SELECT {} FROM statements WHERE id = ?", STATEMENT_COLUMNS);
        sqlx::query_as::<_, Statement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to get statement: {}", e))
    }

    async fn create_statement(&self, statement: NewStatement) -> Result<Option<Statement>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        let cards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_cards WHERE id = ?")
            .bind(statement.card_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| anyhow!("Failed to check card: {}", e))?;
        if cards == 0 {
            return Ok(None);
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO statements \
             (card_id, statement_date, due_date, amount, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(statement.card_id)
        .bind(statement.statement_date)
        .bind(statement.due_date)
        .bind(statement.amount)
        .bind(&statement.status)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| anyhow!("Failed to create statement: {}", e))?;

        tx.commit()
            .await
            .map_err(|e| anyhow!("Failed to commit statement: {}", e))?;
        Ok(Some(statement.into_statement(result.last_insert_rowid(), now)))
    }

    async fn update_statement_status(&self, id: i64, status: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE statements SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to update statement: {}", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn schedule_payment(&self, id: i64, schedule: PaymentSchedule) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE statements \
             SET reviewed_at = ?, scheduled_payment_date = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(schedule.reviewed_at)
        .bind(schedule.scheduled_payment_date)
        .bind(schedule.reviewed_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to schedule payment: {}", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_notified(&self, id: i64, kind: NotificationKind) -> Result<bool> {
        // column name comes from a closed enum
        let sql = format!(
            "UPDATE statements SET {} = 1, updated_at = ? WHERE id = ?",
            kind.column()
        );
        let result = sqlx::query(&sql)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to mark statement notified: {}", e))?;

        Ok(result.rows_affected() > 0)
    }
}
