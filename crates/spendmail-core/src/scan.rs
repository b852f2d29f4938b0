//! Scan orchestration.
//!
//! One algorithm, two entry points: [`Scanner::scan_account`] runs for a
//! single user on demand and returns its summary, [`Scanner::scan_all`] runs
//! for every connected account on the scheduler's behalf and only logs.
//!
//! Per account the cycle is fetch, then extract and persist per message.
//! There is no retry within a cycle; the next scheduled cycle is the retry,
//! made safe by the idempotent store.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use spendmail_gmail::MailProvider;
use spendmail_parse::parse_transaction;
use tracing::{debug, info, warn};

use crate::account::{AccountRepository, ConnectedAccount, UserId};
use crate::transaction::TransactionRepository;
use crate::{Error, Result};

/// Default deadline for fetching one account's candidate messages.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Summary of one account's scan cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    /// Candidate messages fetched.
    pub total_fetched: usize,
    /// Transactions persisted by this cycle.
    pub saved: usize,
    /// Messages skipped: rejected by the extractor or already ingested.
    pub skipped: usize,
}

/// Drives scan cycles against the repositories and a mail provider.
///
/// Holds no state across cycles beyond what it re-reads from the store each
/// time.
pub struct Scanner<M> {
    accounts: Arc<AccountRepository>,
    transactions: Arc<TransactionRepository>,
    mail: Arc<M>,
    fetch_timeout: Duration,
}

impl<M: MailProvider> Scanner<M> {
    /// Create a scanner with the default fetch timeout.
    #[must_use]
    pub fn new(
        accounts: Arc<AccountRepository>,
        transactions: Arc<TransactionRepository>,
        mail: Arc<M>,
    ) -> Self {
        Self {
            accounts,
            transactions,
            mail,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Sets the per-account fetch deadline.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Run one scan cycle for a single user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotConnected`] if the user has no linked
    /// mailbox, [`Error::FetchTimeout`] if the candidate fetch exceeds its
    /// deadline, or the underlying mail/store error.
    pub async fn scan_account(&self, user_id: &UserId) -> Result<ScanOutcome> {
        let account = self
            .accounts
            .get(user_id)
            .await?
            .ok_or_else(|| Error::AccountNotConnected(user_id.clone()))?;
        self.scan_one(&account).await
    }

    /// Run one scan cycle for every connected account.
    ///
    /// Accounts are isolated: a failure in one is logged and the remaining
    /// accounts are still scanned. Nothing propagates past this boundary.
    pub async fn scan_all(&self) {
        let accounts = match self.accounts.list().await {
            Ok(accounts) => accounts,
            Err(error) => {
                warn!(%error, "failed to list connected accounts");
                return;
            }
        };
        debug!(accounts = accounts.len(), "scheduled scan started");

        for account in accounts {
            match self.scan_one(&account).await {
                Ok(outcome) => info!(
                    user_id = %account.user_id,
                    fetched = outcome.total_fetched,
                    saved = outcome.saved,
                    skipped = outcome.skipped,
                    "account scan finished"
                ),
                Err(error) => {
                    warn!(user_id = %account.user_id, %error, "account scan failed");
                }
            }
        }
    }

    /// The shared per-account algorithm: fetch, then extract and persist per
    /// message.
    async fn scan_one(&self, account: &ConnectedAccount) -> Result<ScanOutcome> {
        let credential = account.credential();

        let messages = tokio::time::timeout(
            self.fetch_timeout,
            self.mail.list_candidates(&credential),
        )
        .await
        .map_err(|_elapsed| Error::FetchTimeout(account.user_id.clone()))??;

        let mut outcome = ScanOutcome {
            total_fetched: messages.len(),
            ..ScanOutcome::default()
        };

        for message in messages {
            // Rejection is an expected, frequent outcome; count it quietly.
            let Some(extracted) = parse_transaction(&message.text) else {
                debug!(message_id = %message.id, "not a transaction, skipped");
                outcome.skipped += 1;
                continue;
            };

            if self
                .transactions
                .insert_if_absent(&account.user_id, &message.id, &extracted)
                .await?
            {
                debug!(message_id = %message.id, amount = %extracted.amount, "transaction saved");
                outcome.saved += 1;
            } else {
                debug!(message_id = %message.id, "duplicate, already ingested");
                outcome.skipped += 1;
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use spendmail_gmail::{Credential, RawMessage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned messages per access token; errors for tokens marked bad.
    struct FakeMail {
        inboxes: Mutex<HashMap<String, Vec<RawMessage>>>,
        failing_tokens: Vec<String>,
    }

    impl FakeMail {
        fn new() -> Self {
            Self {
                inboxes: Mutex::new(HashMap::new()),
                failing_tokens: Vec::new(),
            }
        }

        fn with_inbox(self, token: &str, messages: Vec<RawMessage>) -> Self {
            self.inboxes.lock().unwrap().insert(token.to_string(), messages);
            self
        }

        fn with_failing_token(mut self, token: &str) -> Self {
            self.failing_tokens.push(token.to_string());
            self
        }
    }

    impl MailProvider for FakeMail {
        async fn list_candidates(
            &self,
            credential: &Credential,
        ) -> spendmail_gmail::Result<Vec<RawMessage>> {
            if self.failing_tokens.contains(&credential.access_token) {
                return Err(spendmail_gmail::Error::Api {
                    status: 401,
                    message: "token expired".to_string(),
                });
            }
            Ok(self
                .inboxes
                .lock()
                .unwrap()
                .get(&credential.access_token)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn message(id: &str, text: &str) -> RawMessage {
        RawMessage {
            id: id.to_string(),
            subject: "Transaction alert".to_string(),
            from: "alerts@bank.example".to_string(),
            date: String::new(),
            text: text.to_string(),
        }
    }

    async fn connect(accounts: &AccountRepository, user: &str, token: &str) {
        accounts
            .upsert(&ConnectedAccount::new(
                UserId::new(user),
                format!("{user}@example.com"),
                token,
                "refresh",
            ))
            .await
            .unwrap();
    }

    fn scanner(
        accounts: Arc<AccountRepository>,
        transactions: Arc<TransactionRepository>,
        mail: FakeMail,
    ) -> Scanner<FakeMail> {
        Scanner::new(accounts, transactions, Arc::new(mail))
    }

    #[tokio::test]
    async fn counts_saved_and_skipped() {
        let accounts = Arc::new(AccountRepository::in_memory().await.unwrap());
        let transactions = Arc::new(TransactionRepository::in_memory().await.unwrap());
        connect(&accounts, "u-1", "token-1").await;

        let mail = FakeMail::new().with_inbox(
            "token-1",
            vec![
                message("m-1", "Rs. 1,250.50 debited for purchase at Example Store on 17 Sep"),
                message("m-2", "your weekly newsletter"),
                message("m-3", "₹2,000 credited to your account, received from John"),
            ],
        );
        let scanner = scanner(Arc::clone(&accounts), Arc::clone(&transactions), mail);

        let outcome = scanner.scan_account(&UserId::new("u-1")).await.unwrap();
        assert_eq!(outcome.total_fetched, 3);
        assert_eq!(outcome.saved, 2);
        assert_eq!(outcome.skipped, 1);

        let stored = transactions.list_for_user(&UserId::new("u-1")).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn rescanning_same_inbox_is_idempotent() {
        let accounts = Arc::new(AccountRepository::in_memory().await.unwrap());
        let transactions = Arc::new(TransactionRepository::in_memory().await.unwrap());
        connect(&accounts, "u-1", "token-1").await;

        let mail = FakeMail::new().with_inbox(
            "token-1",
            vec![message("m-1", "₹500 debited at Corner Shop")],
        );
        let scanner = scanner(Arc::clone(&accounts), Arc::clone(&transactions), mail);

        let first = scanner.scan_account(&UserId::new("u-1")).await.unwrap();
        let second = scanner.scan_account(&UserId::new("u-1")).await.unwrap();

        assert_eq!(first.saved, 1);
        assert_eq!(second.saved, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(
            transactions.list_for_user(&UserId::new("u-1")).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn unconnected_user_is_an_error() {
        let accounts = Arc::new(AccountRepository::in_memory().await.unwrap());
        let transactions = Arc::new(TransactionRepository::in_memory().await.unwrap());
        let scanner = scanner(Arc::clone(&accounts), transactions, FakeMail::new());

        let result = scanner.scan_account(&UserId::new("ghost")).await;
        assert!(matches!(result, Err(Error::AccountNotConnected(_))));
    }

    #[tokio::test]
    async fn failing_account_does_not_block_others() {
        let accounts = Arc::new(AccountRepository::in_memory().await.unwrap());
        let transactions = Arc::new(TransactionRepository::in_memory().await.unwrap());
        connect(&accounts, "u-1", "token-1").await;
        connect(&accounts, "u-2", "token-bad").await;
        connect(&accounts, "u-3", "token-3").await;

        let mail = FakeMail::new()
            .with_inbox("token-1", vec![message("m-1", "₹100 debited at A")])
            .with_inbox("token-3", vec![message("m-3", "₹300 debited at C")])
            .with_failing_token("token-bad");
        let scanner = scanner(Arc::clone(&accounts), Arc::clone(&transactions), mail);

        scanner.scan_all().await;

        assert_eq!(transactions.list_for_user(&UserId::new("u-1")).await.unwrap().len(), 1);
        assert!(transactions.list_for_user(&UserId::new("u-2")).await.unwrap().is_empty());
        assert_eq!(transactions.list_for_user(&UserId::new("u-3")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        struct SlowMail;

        impl MailProvider for SlowMail {
            async fn list_candidates(
                &self,
                _credential: &Credential,
            ) -> spendmail_gmail::Result<Vec<RawMessage>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }
        }

        let accounts = Arc::new(AccountRepository::in_memory().await.unwrap());
        let transactions = Arc::new(TransactionRepository::in_memory().await.unwrap());
        connect(&accounts, "u-1", "token-1").await;

        let scanner = Scanner::new(Arc::clone(&accounts), transactions, Arc::new(SlowMail))
            .with_fetch_timeout(Duration::from_millis(20));

        let result = scanner.scan_account(&UserId::new("u-1")).await;
        assert!(matches!(result, Err(Error::FetchTimeout(_))));
    }
}
