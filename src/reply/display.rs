//! Client-side split of a stored AI message into summary and response.
//!
//! Stored AI content is normally `Summary: …\nResponse: …`, but older
//! records and error paths may hold a raw JSON object or free text, so the
//! split is heuristic:
//!
//! 1. JSON object → its `summary` / `response` fields.
//! 2. Otherwise `Summary:` (rest of line) and `Response:` (rest of text),
//!    matched case-insensitively.
//! 3. Nothing found → the whole content becomes the response.
//!
//! The response is then unquoted and, when it is itself JSON, pretty-printed.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{looks_like_json_container, value_text};

static SUMMARY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Summary:\s*(.*?)(?:\n|$)").expect("valid regex"));
static RESPONSE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)Response:\s*(.*)").expect("valid regex"));

/// The two parts of an AI message as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayReply {
    pub summary: String,
    pub response: String,
}

/// Split stored AI `content` into its display parts.
pub fn split_ai_content(content: &str) -> DisplayReply {
    let (summary, mut response) = match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => (
            field_text(map.get("summary")),
            field_text(map.get("response")),
        ),
        // Parsed, but nothing to pull fields from.
        Ok(_) => (String::new(), String::new()),
        Err(_) => {
            let summary = SUMMARY_LINE
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let response = RESPONSE_TAIL
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            (summary, response)
        }
    };

    if summary.is_empty() && response.is_empty() {
        response = content.to_string();
    }

    DisplayReply { summary, response: tidy_response(&response) }
}

/// Falsy JSON values (`null`, `""`, `false`, `0`) read as empty, like a
/// missing field.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(v) => value_text(v),
    }
}

/// Drop one pair of wrapping quotes, then pretty-print embedded JSON.
fn tidy_response(response: &str) -> String {
    let unquoted = response.strip_prefix('"').unwrap_or(response);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);

    if looks_like_json_container(unquoted) {
        if let Ok(parsed) = serde_json::from_str::<Value>(unquoted) {
            return match parsed {
                Value::String(s) => s,
                other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| unquoted.to_string()),
            };
        }
    }
    unquoted.to_string()
}
