//! The chat message record persisted in history.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::reply::Reply;

/// Who produced a message. Serialised as `"user"` / `"ai"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One history entry: `{content, type, timestamp, model}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub sender: Sender,
    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, model: Option<String>) -> Self {
        Self { content: content.into(), sender: Sender::User, timestamp: now_timestamp(), model }
    }

    pub fn ai(content: impl Into<String>, model: Option<String>) -> Self {
        Self { content: content.into(), sender: Sender::Ai, timestamp: now_timestamp(), model }
    }

    /// AI message holding a server reply in its stored text form.
    pub fn from_reply(reply: &Reply, model: Option<String>) -> Self {
        Self::ai(reply_content(reply), model)
    }
}

/// Stored text form of a reply: `Summary: …\nResponse: …`.
pub fn reply_content(reply: &Reply) -> String {
    format!("Summary: {}\nResponse: {}", reply.summary, reply.response)
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
