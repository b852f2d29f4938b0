//! Extraction output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency code assigned to every extracted transaction.
///
/// The extractor does not attempt multi-currency recognition; all amounts are
/// reported in the domestic default.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Money entering the account.
    Credit,
    /// Money leaving the account.
    Debit,
}

impl TransactionKind {
    /// Uppercase wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }

    /// Lowercase cue word used by the description fallback.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monetary amount in minor units (paise).
///
/// Storing minor units as an integer keeps arithmetic and equality exact; the
/// extractor honors at most two decimal places, so the conversion from the
/// captured decimal text is lossless.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Create an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Parse a decimal string with optional thousands separators and at most
    /// two fractional digits, e.g. `"1,250.50"`.
    ///
    /// Returns `None` for malformed input, more than two fractional digits,
    /// or overflow.
    #[must_use]
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let cleaned = text.replace(',', "");
        let (major, frac) = cleaned
            .split_once('.')
            .map_or((cleaned.as_str(), ""), |(m, f)| (m, f));

        let mut minor = major.parse::<i64>().ok()?.checked_mul(100)?;
        if !frac.is_empty() {
            if frac.len() > 2 {
                return None;
            }
            let mut fractional = frac.parse::<i64>().ok()?;
            if frac.len() == 1 {
                fractional *= 10;
            }
            minor = minor.checked_add(fractional)?;
        }
        Some(Self(minor))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let minor = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", minor / 100, minor % 100)
    }
}

/// A transaction successfully extracted from message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parsed {
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Strictly positive amount.
    pub amount: Amount,
    /// Currency code (always [`DEFAULT_CURRENCY`]).
    pub currency: String,
    /// Merchant or short summary, `"Unknown"` when nothing was found.
    pub description: String,
    /// Date named in the text, or the extraction time when absent.
    pub transaction_date: DateTime<Utc>,
}
