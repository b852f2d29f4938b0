//! Gmail REST implementation of the mail-access capability.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::body::{MessagePart, flatten_text};
use crate::error::{Error, Result};
use crate::provider::{Credential, MailProvider, RawMessage};

/// Inbox-only keyword pre-filter. Recall-oriented: it narrows the candidate
/// set, the extractor does the real classification.
pub const CANDIDATE_QUERY: &str = "in:inbox (credit OR debit OR credited OR debited OR transaction)";

/// Messages fetched per scan cycle. A backlog is swept incrementally across
/// cycles; duplicates are a no-op at the store.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Gmail REST client.
pub struct GmailClient {
    http: reqwest::Client,
    page_size: u32,
}

impl GmailClient {
    /// Create a client with the given page cap and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(page_size: u32, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { http, page_size })
    }

    async fn list_ids(&self, credential: &Credential) -> Result<Vec<String>> {
        let url = format!("{API_BASE}/messages");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&credential.access_token)
            .query(&[
                ("q", CANDIDATE_QUERY.to_string()),
                ("maxResults", self.page_size.to_string()),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;
        let list: ListResponse = response.json().await?;
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    /// Fetch one message in full and reduce its body to flat text.
    ///
    /// Returns `Ok(None)` for messages with no payload or an empty flattened
    /// body; those carry no signal for the extractor.
    async fn fetch_message(&self, credential: &Credential, id: &str) -> Result<Option<RawMessage>> {
        let url = format!("{API_BASE}/messages/{id}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&credential.access_token)
            .query(&[("format", "full")])
            .send()
            .await?;
        let response = check_status(response).await?;
        let message: MessageResponse = response.json().await?;
        Ok(reduce_message(message))
    }
}

/// Reduce a fetched message to flat text. Messages without a payload or with
/// an empty flattened body carry no signal for the extractor and are dropped.
fn reduce_message(message: MessageResponse) -> Option<RawMessage> {
    let payload = message.payload?;
    let text = flatten_text(&payload);
    if text.is_empty() {
        return None;
    }

    Some(RawMessage {
        id: message.id,
        subject: payload.header("Subject").unwrap_or_default().to_string(),
        from: payload.header("From").unwrap_or_default().to_string(),
        date: payload.header("Date").unwrap_or_default().to_string(),
        text,
    })
}

impl MailProvider for GmailClient {
    async fn list_candidates(&self, credential: &Credential) -> Result<Vec<RawMessage>> {
        let ids = self.list_ids(credential).await?;
        debug!(candidates = ids.len(), "listed candidate messages");

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            match self.fetch_message(credential, &id).await {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => debug!(message_id = %id, "dropped message with empty body"),
                // One bad message must not abort the batch.
                Err(error) => warn!(message_id = %id, %error, "failed to fetch message, skipping"),
            }
        }
        Ok(messages)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: String,
    #[serde(default)]
    payload: Option<MessagePart>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn candidate_query_is_inbox_only() {
        assert!(CANDIDATE_QUERY.starts_with("in:inbox"));
        for keyword in ["credit", "debit", "credited", "debited", "transaction"] {
            assert!(CANDIDATE_QUERY.contains(keyword));
        }
    }

    #[test]
    fn list_response_tolerates_missing_messages_field() {
        let list: ListResponse = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_empty());
    }

    #[test]
    fn message_response_parses_nested_payload() {
        let raw = r#"{
            "id": "m1",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "Subject", "value": "Alert"},
                    {"name": "From", "value": "alerts@bank.example"}
                ],
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGVsbG8=", "size": 5}}
                ]
            }
        }"#;
        let message: MessageResponse = serde_json::from_str(raw).unwrap();

        let reduced = reduce_message(message).unwrap();
        assert_eq!(reduced.id, "m1");
        assert_eq!(reduced.subject, "Alert");
        assert_eq!(reduced.from, "alerts@bank.example");
        assert_eq!(reduced.date, "");
        assert_eq!(reduced.text, "hello");
    }

    #[test]
    fn message_without_payload_is_dropped() {
        let message = MessageResponse {
            id: "m1".to_string(),
            payload: None,
        };
        assert!(reduce_message(message).is_none());
    }

    #[test]
    fn empty_flattened_body_is_dropped() {
        // A payload whose leaves decode to pure whitespace flattens to "".
        let raw = r#"{
            "id": "m1",
            "payload": {
                "mimeType": "multipart/alternative",
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "ICAgIA==", "size": 4}}
                ]
            }
        }"#;
        let message: MessageResponse = serde_json::from_str(raw).unwrap();
        assert!(reduce_message(message).is_none());
    }
}
