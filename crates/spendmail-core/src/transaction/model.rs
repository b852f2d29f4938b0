//! Transaction model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spendmail_parse::{Amount, TransactionKind};

use crate::account::UserId;

/// Unique identifier for a stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl TransactionId {
    /// Create a new transaction ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a transaction entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionOrigin {
    /// Extracted from a mailbox message.
    Mail,
    /// Entered by the user.
    Manual,
}

impl TransactionOrigin {
    /// Uppercase wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mail => "MAIL",
            Self::Manual => "MANUAL",
        }
    }
}

/// A stored ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier (None for unsaved records).
    pub id: Option<TransactionId>,
    /// Owning user.
    pub user_id: UserId,
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Strictly positive amount.
    pub amount: Amount,
    /// Currency code.
    pub currency: String,
    /// Merchant or short summary.
    pub description: String,
    /// How the record entered the ledger.
    pub origin: TransactionOrigin,
    /// Source message identifier; `Some` iff origin is [`TransactionOrigin::Mail`].
    /// Globally unique across the whole ledger.
    pub source_message_id: Option<String>,
    /// Date the transaction happened (extracted, or the ingestion time).
    pub transaction_date: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// A user-entered transaction, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualEntry {
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Strictly positive amount.
    pub amount: Amount,
    /// Currency code.
    pub currency: String,
    /// Free-text description.
    pub description: String,
    /// Date the transaction happened.
    pub transaction_date: DateTime<Utc>,
}
