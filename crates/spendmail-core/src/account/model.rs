//! Connected account model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spendmail_gmail::Credential;

/// Identifier of an end user, issued by the external auth system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A mailbox linked to a user, with its access credentials.
///
/// At most one exists per user; connecting again replaces the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedAccount {
    /// Owning user.
    pub user_id: UserId,
    /// Linked mailbox address.
    pub email: String,
    /// Access token for the mail service.
    pub access_token: String,
    /// Refresh token held for the credential provider.
    pub refresh_token: String,
    /// Access token expiry, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Scope granted during the credential exchange.
    pub scope: Option<String>,
}

impl ConnectedAccount {
    /// Create a connected account from a credential exchange result.
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            email: email.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
            scope: None,
        }
    }

    /// Sets the token expiry.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Read-only credential handle for the mail service.
    ///
    /// The scan path only reads this; refreshing an expired token is the
    /// credential provider's job.
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn user_id_display() {
        let id = UserId::new("u-42");
        assert_eq!(format!("{id}"), "u-42");
        assert_eq!(id.as_str(), "u-42");
    }

    #[test]
    fn builder_fields() {
        let expiry = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let account = ConnectedAccount::new(UserId::new("u-1"), "a@b.com", "at", "rt")
            .with_expires_at(expiry)
            .with_scope("mail.readonly");
        assert_eq!(account.email, "a@b.com");
        assert_eq!(account.expires_at, Some(expiry));
        assert_eq!(account.scope.as_deref(), Some("mail.readonly"));
    }

    #[test]
    fn credential_copies_tokens() {
        let account = ConnectedAccount::new(UserId::new("u-1"), "a@b.com", "access", "refresh");
        let credential = account.credential();
        assert_eq!(credential.access_token, "access");
        assert_eq!(credential.refresh_token, "refresh");
    }
}
