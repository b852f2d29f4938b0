//! # spendmail-gmail
//!
//! Candidate-message fetching for the `SpendMail` ingestion pipeline.
//!
//! This crate owns the mail-access boundary:
//!
//! - [`Credential`]: an opaque, read-only token handle for one mailbox.
//!   Token acquisition and refresh live with the credential provider, not
//!   here.
//! - [`MailProvider`]: the capability the scan orchestrator consumes; it
//!   lists candidate messages for a credential, already reduced to flat text.
//! - [`GmailClient`]: the Gmail REST implementation, an inbox-only keyword
//!   query with a small page cap followed by a full fetch per message.
//! - [`MessagePart`] / [`flatten_text`]: the recursive multipart body tree
//!   and its reduction to whitespace-normalized plain text.
//!
//! Messages whose flattened body is empty carry no signal and are dropped
//! before they reach the extractor. A fetch failure for one message is
//! logged and skipped; it never aborts the batch.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod body;
mod client;
mod error;
mod provider;

pub use body::{MessagePart, MessagePartBody, MessagePartHeader, flatten_text};
pub use client::{CANDIDATE_QUERY, DEFAULT_PAGE_SIZE, GmailClient};
pub use error::{Error, Result};
pub use provider::{Credential, MailProvider, RawMessage};
