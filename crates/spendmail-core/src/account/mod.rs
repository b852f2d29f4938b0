//! Connected account management.
//!
//! One connected mailbox per user, created or replaced on credential
//! exchange, read (never mutated) by the scan orchestrator, deleted on
//! explicit disconnect.

mod model;
mod repository;

pub use model::{ConnectedAccount, UserId};
pub use repository::AccountRepository;
