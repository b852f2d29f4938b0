//! The mail-access capability consumed by the scan orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::Result;

/// Read-only credential handle for one mailbox.
///
/// The scan path never mutates a credential; acquiring and refreshing tokens
/// is the credential provider's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token presented to the mail service.
    pub access_token: String,
    /// Refresh token held for the credential provider's use.
    pub refresh_token: String,
    /// Access token expiry, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A fetched candidate message, reduced to flat text.
///
/// Transient: constructed by the fetcher, consumed immediately by the
/// extractor, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Provider-assigned message identifier, globally unique per mailbox.
    pub id: String,
    /// Subject header, empty if absent.
    pub subject: String,
    /// From header, empty if absent.
    pub from: String,
    /// Date header as sent, empty if absent.
    pub date: String,
    /// Flattened body text, non-empty after trimming.
    pub text: String,
}

/// Capability to list candidate transaction messages for a credential.
///
/// Implementations must apply the coarse pre-filter (inbox only, transaction
/// keywords, bounded page size) and drop messages whose flattened body is
/// empty. The returned order is unspecified.
pub trait MailProvider: Send + Sync {
    /// Fetch candidate messages for one account.
    ///
    /// A failure fetching an individual message must be skipped, not
    /// propagated; only a failure of the listing itself is an error.
    fn list_candidates(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<RawMessage>>> + Send;
}
