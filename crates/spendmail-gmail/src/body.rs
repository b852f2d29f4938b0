//! Multipart body trees and their reduction to flat text.
//!
//! A fetched message body is a bounded tree of parts: a leaf carries
//! base64url-encoded content, a node carries child parts. [`flatten_text`]
//! decodes every leaf and concatenates the results in tree order.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// One header of a fetched message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePartHeader {
    /// Header name, e.g. `Subject`.
    #[serde(default)]
    pub name: String,
    /// Header value.
    #[serde(default)]
    pub value: String,
}

/// Content of a leaf part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePartBody {
    /// Base64url-encoded part content, absent for container parts.
    #[serde(default)]
    pub data: Option<String>,
    /// Decoded size in bytes, as reported by the service.
    #[serde(default)]
    pub size: i64,
}

/// One node of a message body tree, as returned by the mail service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    /// MIME type of this part.
    #[serde(default)]
    pub mime_type: String,
    /// Headers attached to this part (populated on the root payload).
    #[serde(default)]
    pub headers: Vec<MessagePartHeader>,
    /// Leaf content, if any.
    #[serde(default)]
    pub body: Option<MessagePartBody>,
    /// Child parts, empty for leaves.
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }
}

/// Reduce a body tree to flat text.
///
/// Leaves are decoded and concatenated in tree order, joined by single
/// spaces, with whitespace runs collapsed and the result trimmed. A part
/// that carries its own content is treated as a leaf even when child parts
/// are present. Undecodable leaves are skipped.
#[must_use]
pub fn flatten_text(part: &MessagePart) -> String {
    let mut chunks = Vec::new();
    collect_text(part, &mut chunks);
    let joined = chunks.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(part: &MessagePart, out: &mut Vec<String>) {
    if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref()) {
        if let Some(text) = decode_part_data(data) {
            out.push(text);
        }
        return;
    }
    for child in &part.parts {
        collect_text(child, out);
    }
}

/// Decode base64url part content, tolerating standard-alphabet and unpadded
/// variants seen in the wild.
fn decode_part_data(data: &str) -> Option<String> {
    let bytes = URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data))
        .or_else(|_| STANDARD.decode(data))
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> MessagePart {
        MessagePart {
            mime_type: "text/plain".to_string(),
            body: Some(MessagePartBody {
                data: Some(URL_SAFE.encode(text)),
                size: i64::try_from(text.len()).unwrap(),
            }),
            ..Default::default()
        }
    }

    fn node(parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: "multipart/alternative".to_string(),
            parts,
            ..Default::default()
        }
    }

    #[test]
    fn single_leaf() {
        assert_eq!(flatten_text(&leaf("Rs. 500 debited")), "Rs. 500 debited");
    }

    #[test]
    fn nested_leaves_concatenated_in_tree_order() {
        let tree = node(vec![
            leaf("first part"),
            node(vec![leaf("second part"), leaf("third part")]),
        ]);
        assert_eq!(flatten_text(&tree), "first part second part third part");
    }

    #[test]
    fn whitespace_runs_collapsed() {
        let tree = node(vec![leaf("a  lot\n\nof\twhitespace "), leaf(" here")]);
        assert_eq!(flatten_text(&tree), "a lot of whitespace here");
    }

    #[test]
    fn leaf_content_wins_over_children() {
        let mut tree = leaf("own content");
        tree.parts = vec![leaf("ignored child")];
        assert_eq!(flatten_text(&tree), "own content");
    }

    #[test]
    fn undecodable_leaf_skipped() {
        let bad = MessagePart {
            body: Some(MessagePartBody {
                data: Some("%%% not base64 %%%".to_string()),
                size: 0,
            }),
            ..Default::default()
        };
        let tree = node(vec![bad, leaf("still here")]);
        assert_eq!(flatten_text(&tree), "still here");
    }

    #[test]
    fn empty_tree_flattens_to_empty() {
        assert_eq!(flatten_text(&node(vec![])), "");
        assert_eq!(flatten_text(&MessagePart::default()), "");
    }

    #[test]
    fn standard_alphabet_accepted() {
        let part = MessagePart {
            body: Some(MessagePartBody {
                data: Some(STANDARD.encode("mixed alphabet body")),
                size: 0,
            }),
            ..Default::default()
        };
        assert_eq!(flatten_text(&part), "mixed alphabet body");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let part = MessagePart {
            headers: vec![MessagePartHeader {
                name: "Subject".to_string(),
                value: "Transaction alert".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(part.header("subject"), Some("Transaction alert"));
        assert_eq!(part.header("SUBJECT"), Some("Transaction alert"));
        assert_eq!(part.header("From"), None);
    }
}
