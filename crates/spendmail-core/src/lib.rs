//! # spendmail-core
//!
//! Core business logic for the `SpendMail` ingestion service.
//!
//! This crate provides:
//! - Connected account management (one linked mailbox per user)
//! - The idempotent transaction store (`SQLite`)
//! - The scan orchestrator (fetch, extract, persist, count)
//! - The process-wide scan scheduler
//!
//! The correctness contract of the whole pipeline lives here: reprocessing a
//! source message never creates a second ledger entry, and no entry is ever
//! created without a discoverable kind and a strictly positive amount.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod error;
pub mod scan;
pub mod scheduler;
pub mod transaction;

pub use account::{AccountRepository, ConnectedAccount, UserId};
pub use error::{Error, Result};
pub use scan::{ScanOutcome, Scanner};
pub use scheduler::Scheduler;
pub use spendmail_parse::{Amount, Parsed, TransactionKind};
pub use transaction::{
    ManualEntry, Transaction, TransactionId, TransactionOrigin, TransactionRepository,
};
