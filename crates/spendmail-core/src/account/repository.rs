//! Connected account storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::model::{ConnectedAccount, UserId};
use crate::Result;

/// Repository for connected account storage and retrieval.
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
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
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS connected_accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                expires_at TEXT,
                scope TEXT,
                connected_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create or replace the connected account for a user.
    ///
    /// Connecting a mailbox again overwrites the previous credentials; at
    /// most one row exists per user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn upsert(&self, account: &ConnectedAccount) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO connected_accounts
                (user_id, email, access_token, refresh_token, expires_at, scope)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                email = excluded.email,
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                scope = excluded.scope,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(account.user_id.as_str())
        .bind(&account.email)
        .bind(&account.access_token)
        .bind(&account.refresh_token)
        .bind(account.expires_at.map(|dt| dt.to_rfc3339()))
        .bind(&account.scope)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the connected account for a user, if any.
    ///
    /// This is the credential provider boundary the orchestrator reads from.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<ConnectedAccount>> {
        let row = sqlx::query(
            r"
            SELECT user_id, email, access_token, refresh_token, expires_at, scope
            FROM connected_accounts
            WHERE user_id = ?
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    /// Get all connected accounts, for a scheduled scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<ConnectedAccount>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, email, access_token, refresh_token, expires_at, scope
            FROM connected_accounts
            ORDER BY user_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_account).collect())
    }

    /// Disconnect a user's mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, user_id: &UserId) -> Result<()> {
        sqlx::query("DELETE FROM connected_accounts WHERE user_id = ?")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Convert a database row to a `ConnectedAccount`.
fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> ConnectedAccount {
    let expires_at: Option<String> = row.get("expires_at");
    let expires_at = expires_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    ConnectedAccount {
        user_id: UserId::new(row.get::<String, _>("user_id")),
        email: row.get("email"),
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        expires_at,
        scope: row.get("scope"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn account(user: &str, email: &str) -> ConnectedAccount {
        ConnectedAccount::new(UserId::new(user), email, "access", "refresh")
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let repo = AccountRepository::in_memory().await.unwrap();
        let expiry = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let connected = account("u-1", "one@example.com")
            .with_expires_at(expiry)
            .with_scope("mail.readonly");

        repo.upsert(&connected).await.unwrap();

        let loaded = repo.get(&UserId::new("u-1")).await.unwrap().unwrap();
        assert_eq!(loaded.email, "one@example.com");
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.expires_at, Some(expiry));
        assert_eq!(loaded.scope.as_deref(), Some("mail.readonly"));
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let repo = AccountRepository::in_memory().await.unwrap();
        repo.upsert(&account("u-1", "old@example.com")).await.unwrap();

        let mut replacement = account("u-1", "new@example.com");
        replacement.access_token = "fresh-token".to_string();
        repo.upsert(&replacement).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "new@example.com");
        assert_eq!(all[0].access_token, "fresh-token");
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = AccountRepository::in_memory().await.unwrap();
        assert!(repo.get(&UserId::new("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_all_accounts() {
        let repo = AccountRepository::in_memory().await.unwrap();
        repo.upsert(&account("u-2", "two@example.com")).await.unwrap();
        repo.upsert(&account("u-1", "one@example.com")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user_id.as_str(), "u-1");
        assert_eq!(all[1].user_id.as_str(), "u-2");
    }

    #[tokio::test]
    async fn delete_disconnects() {
        let repo = AccountRepository::in_memory().await.unwrap();
        repo.upsert(&account("u-1", "one@example.com")).await.unwrap();

        repo.delete(&UserId::new("u-1")).await.unwrap();
        assert!(repo.get(&UserId::new("u-1")).await.unwrap().is_none());
    }
}
