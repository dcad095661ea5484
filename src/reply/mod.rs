//! Summary/response reply handling.
//!
//! Models are asked for a `{"summary": …, "response": …}` JSON object but
//! routinely answer with prose, fenced JSON, comments or half-escaped
//! strings. This module turns whatever came back into a [`Reply`]:
//!
//! - **extract** — server side, raw model text → reply (multi-strategy repair).
//! - **clean** — server side, normalises a parsed reply before it is sent.
//! - **display** — client side, splits a stored AI message back into its
//!   summary and response for rendering.

pub mod clean;
pub mod display;
pub mod extract;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};

pub use clean::clean_reply;
pub use display::{DisplayReply, split_ai_content};
pub use extract::{extract_reply, try_parse_json};

/// A summary/response pair as exchanged between server and client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub summary: String,
    pub response: String,
}

impl Reply {
    pub fn new(summary: impl Into<String>, response: impl Into<String>) -> Self {
        Self { summary: summary.into(), response: response.into() }
    }

    /// JSON object form, the input shape of [`clean_reply`].
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "summary": self.summary, "response": self.response })
    }
}

/// Display form of a JSON value: strings verbatim, everything else as
/// compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Single-line JSON with `", "` and `": "` separators, keys in source order.
pub(crate) fn spaced_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// `true` when `s` is bracketed like a JSON object or array.
pub(crate) fn looks_like_json_container(s: &str) -> bool {
    (s.starts_with('{') && s.ends_with('}')) || (s.starts_with('[') && s.ends_with(']'))
}

/// Byte span from the first `{` to the last `}`, if the latter follows the former.
pub(crate) fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_span_finds_outermost_object() {
        assert_eq!(brace_span(r#"Sure! {"a": {"b": 1}} done"#), Some(r#"{"a": {"b": 1}}"#));
        assert_eq!(brace_span("no braces"), None);
        assert_eq!(brace_span("} backwards {"), None);
    }

    #[test]
    fn container_detection() {
        assert!(looks_like_json_container("{}"));
        assert!(looks_like_json_container("[1, 2]"));
        assert!(!looks_like_json_container("{ unterminated"));
        assert!(!looks_like_json_container("plain"));
    }

    #[test]
    fn spaced_json_keeps_key_order_and_spacing() {
        let v: Value = serde_json::from_str(r#"{"zeta": [1,2], "alpha": {"k":"v"}, "mid": "é"}"#).unwrap();
        assert_eq!(spaced_json(&v), r#"{"zeta": [1, 2], "alpha": {"k": "v"}, "mid": "é"}"#);
        assert_eq!(spaced_json(&serde_json::json!([])), "[]");
        assert_eq!(spaced_json(&serde_json::json!({})), "{}");
    }

    #[test]
    fn value_text_keeps_strings_raw() {
        assert_eq!(value_text(&Value::String("hi".into())), "hi");
        assert_eq!(value_text(&serde_json::json!(42)), "42");
        assert_eq!(value_text(&serde_json::json!({"k": 1})), r#"{"k":1}"#);
    }
}
