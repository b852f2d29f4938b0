//! # spendmail-parse
//!
//! Heuristic extraction of structured transactions from bank notification
//! text.
//!
//! The entry point is [`parse_transaction`] (or [`parse_transaction_at`] for
//! deterministic tests): a pure function mapping free-form message text to a
//! [`Parsed`] record or `None` when the text does not describe a transaction.
//! Rejection is an expected outcome, not an error.
//!
//! Extraction runs four stages in a fixed order:
//!
//! 1. **Kind**: debit cues are checked before credit cues; any debit cue
//!    classifies the text as a debit even if credit cues are also present.
//! 2. **Amount**: three regex families tried in strict priority: currency
//!    symbol, currency code/abbreviation, amount keyword. The first family to
//!    match wins outright.
//! 3. **Date**: a `<day> <month-abbreviation>` pattern combined with the
//!    current year; absent or invalid, the extraction time is used.
//! 4. **Description**: a `{at|to|from} <merchant>` capture, then a short
//!    sentence containing the kind keyword, then the literal `"Unknown"`.
//!
//! ```ignore
//! use spendmail_parse::{TransactionKind, parse_transaction};
//!
//! let parsed = parse_transaction("Rs. 499 paid at Coffee House on 3 Mar").unwrap();
//! assert_eq!(parsed.kind, TransactionKind::Debit);
//! assert_eq!(parsed.amount.minor(), 49900);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod model;
mod parse;
mod patterns;

pub use model::{Amount, Parsed, TransactionKind, DEFAULT_CURRENCY};
pub use parse::{normalize_text, parse_transaction, parse_transaction_at};
