//! The durable transaction ledger.
//!
//! Records are insert-only: the ingestion path never updates or deletes.
//! Uniqueness on the source message identifier is the pipeline's core
//! correctness invariant.

mod model;
mod repository;

pub use model::{ManualEntry, Transaction, TransactionId, TransactionOrigin};
pub use repository::TransactionRepository;
