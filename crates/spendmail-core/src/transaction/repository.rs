//! Transaction storage repository.
//!
//! The write path is a single atomic conditional insert against the unique
//! index on `source_message_id`; there is deliberately no check-then-insert
//! anywhere, so concurrent and repeated scans of the same message are safe.

use chrono::{DateTime, Utc};
use spendmail_parse::{Amount, Parsed, TransactionKind};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::model::{ManualEntry, Transaction, TransactionId, TransactionOrigin};
use crate::account::UserId;
use crate::{Error, Result};

/// Repository for transaction storage and retrieval.
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        // UNIQUE on source_message_id enforces the idempotency invariant;
        // SQLite permits multiple NULLs, so manual entries never collide.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount_minor INTEGER NOT NULL CHECK (amount_minor > 0),
                currency TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT 'Unknown',
                origin TEXT NOT NULL,
                source_message_id TEXT UNIQUE,
                transaction_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_transactions_user_date
            ON transactions(user_id, transaction_date)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist an extracted transaction unless its source message was already
    /// ingested.
    ///
    /// Returns whether *this* call performed the insert. `false` means the
    /// message was ingested before, which is an expected outcome, not an
    /// error. The
    /// insert is atomic with respect to the uniqueness constraint, so
    /// arbitrary concurrent callers store exactly one record per message.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not strictly positive or the
    /// database query fails.
    pub async fn insert_if_absent(
        &self,
        user_id: &UserId,
        source_message_id: &str,
        parsed: &Parsed,
    ) -> Result<bool> {
        if !parsed.amount.is_positive() {
            return Err(Error::NonPositiveAmount(parsed.amount));
        }

        let result = sqlx::query(
            r"
            INSERT INTO transactions
                (user_id, kind, amount_minor, currency, description, origin,
                 source_message_id, transaction_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(source_message_id) DO NOTHING
            ",
        )
        .bind(user_id.as_str())
        .bind(parsed.kind.as_str())
        .bind(parsed.amount.minor())
        .bind(&parsed.currency)
        .bind(&parsed.description)
        .bind(TransactionOrigin::Mail.as_str())
        .bind(source_message_id)
        .bind(parsed.transaction_date.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record a user-entered transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not strictly positive or the
    /// database query fails.
    pub async fn record_manual(
        &self,
        user_id: &UserId,
        entry: &ManualEntry,
    ) -> Result<TransactionId> {
        if !entry.amount.is_positive() {
            return Err(Error::NonPositiveAmount(entry.amount));
        }

        let result = sqlx::query(
            r"
            INSERT INTO transactions
                (user_id, kind, amount_minor, currency, description, origin,
                 source_message_id, transaction_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?)
            ",
        )
        .bind(user_id.as_str())
        .bind(entry.kind.as_str())
        .bind(entry.amount.minor())
        .bind(&entry.currency)
        .bind(&entry.description)
        .bind(TransactionOrigin::Manual.as_str())
        .bind(entry.transaction_date.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(TransactionId::new(result.last_insert_rowid()))
    }

    /// Get all transactions for a user, newest transaction date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, kind, amount_minor, currency, description, origin,
                   source_message_id, transaction_date, created_at
            FROM transactions
            WHERE user_id = ?
            ORDER BY transaction_date DESC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_transaction).collect())
    }
}

/// Convert a database row to a `Transaction`.
fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Option<Transaction> {
    let transaction_date = parse_rfc3339(&row.get::<String, _>("transaction_date"))?;
    let created_at = parse_rfc3339(&row.get::<String, _>("created_at"))?;

    Some(Transaction {
        id: Some(TransactionId::new(row.get("id"))),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        kind: string_to_kind(row.get("kind")),
        amount: Amount::from_minor(row.get("amount_minor")),
        currency: row.get("currency"),
        description: row.get("description"),
        origin: string_to_origin(row.get("origin")),
        source_message_id: row.get("source_message_id"),
        transaction_date,
        created_at,
    })
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn string_to_kind(s: &str) -> TransactionKind {
    match s {
        "CREDIT" => TransactionKind::Credit,
        _ => TransactionKind::Debit,
    }
}

fn string_to_origin(s: &str) -> TransactionOrigin {
    match s {
        "MANUAL" => TransactionOrigin::Manual,
        _ => TransactionOrigin::Mail,
    }
}
