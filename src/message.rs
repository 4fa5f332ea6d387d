//! Upstream message records and the per-person message filter.

use serde::{Deserialize, Serialize};

/// One free-text message as returned by the upstream collection.
///
/// Every field is optional: the upstream data carries records with missing
/// names, ids and text, and duplicate ids across pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn new(user_name: &str, message: &str) -> Self {
        Message {
            user_name: Some(user_name.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn user_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("")
    }

    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// One page of the upstream collection. Any other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Option<Vec<Message>>,
}

impl Page {
    pub fn into_items(self) -> Vec<Message> {
        self.items.unwrap_or_default()
    }
}

/// Case-folds and collapses whitespace runs to single spaces.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Texts of the messages whose author name contains `name_query`.
///
/// Matching is a substring test over normalized names, so "John" matches
/// "John Smith". Blank messages are never returned.
pub fn messages_for<'a>(all_messages: &'a [Message], name_query: &str) -> Vec<&'a str> {
    let target = normalize(name_query);
    all_messages
        .iter()
        .filter(|m| normalize(m.user_name()).contains(&target))
        .map(Message::text)
        .filter(|text| !text.trim().is_empty())
        .collect()
}
