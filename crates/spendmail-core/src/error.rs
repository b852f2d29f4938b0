//! Error types for the core library.

use thiserror::Error;

use crate::account::UserId;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Mail service operation failed.
    #[error("Mail error: {0}")]
    Mail(#[from] spendmail_gmail::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No mailbox is connected for the user.
    #[error("No connected account for user {0}")]
    AccountNotConnected(UserId),

    /// The candidate fetch exceeded its deadline.
    #[error("Fetch timed out for user {0}")]
    FetchTimeout(UserId),

    /// A transaction with a non-positive amount was offered to the store.
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(spendmail_parse::Amount),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
