//! Server-side extraction of a [`Reply`] from raw model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{Reply, brace_span, value_text};

pub const NO_SUMMARY: &str = "Could not parse summary.";
pub const INCOMPLETE_RESPONSE: &str = "I apologize, but I couldn't generate a complete response.";
pub const NO_RESPONSE: &str =
    "I apologize, but I couldn't generate a proper response. Please try rephrasing your question.";
pub const UNSTRUCTURED_SUMMARY: &str = "Response received";

static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").expect("valid regex"));
static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
static NULL_SENTIMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""sentiment"\s*:\s*null"#).expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static SUMMARY_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""summary"\s*:\s*"([^"]*)""#).expect("valid regex"));
static RESPONSE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""response"\s*:\s*"([^"]*)""#).expect("valid regex"));
static SUMMARY_FIELD_CI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"summary"\s*:\s*"([^"]*)""#).expect("valid regex"));
static RESPONSE_FIELD_CI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)"response"\s*:\s*"([^"]*)""#).expect("valid regex"));

/// Turn raw model output into a [`Reply`].
///
/// The `{…}` span of `raw` is tried as JSON as-is, then after repair, then by
/// pulling the two string fields out with patterns. A span that yields
/// nothing at all degrades to [`UNSTRUCTURED_SUMMARY`] with the raw text; an
/// object without both keys, or text with no span, is rebuilt from its prose
/// lines.
pub fn extract_reply(raw: &str, user_prompt: &str) -> Reply {
    if let Some(span) = brace_span(raw) {
        match parse_span(span, user_prompt) {
            Some(Value::Object(obj)) if obj.contains_key("summary") && obj.contains_key("response") => {
                return accepted(&obj);
            }
            Some(_) => {}
            None => {
                warn!(raw_len = raw.len(), "no usable JSON fields in model output");
                return Reply::new(UNSTRUCTURED_SUMMARY, raw.trim());
            }
        }
    }

    Reply::new(format!("User asked: {user_prompt}"), prose_response(raw))
}

/// Strategies 1–3 over the `{…}` span. `None` when all of them fail.
fn parse_span(span: &str, user_prompt: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(span) {
        Ok(v) => return Some(v),
        Err(e) => debug!(error = %e, "model JSON did not parse as-is"),
    }

    let repaired = repair_json(span);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(v) => return Some(v),
        Err(e) => debug!(error = %e, "model JSON did not parse after repair"),
    }

    let summary = capture(&SUMMARY_FIELD, &repaired);
    let response = capture(&RESPONSE_FIELD, &repaired);
    if summary.is_none() && response.is_none() {
        return None;
    }
    Some(serde_json::json!({
        "summary": summary.unwrap_or_else(|| format!("User asked: {user_prompt}")),
        "response": response.unwrap_or_else(|| INCOMPLETE_RESPONSE.to_string()),
    }))
}

/// Fix the mistakes small models commonly make when emitting JSON.
pub fn repair_json(text: &str) -> String {
    let text = LINE_COMMENT.replace_all(text, "");
    let text = BLOCK_COMMENT.replace_all(&text, "");
    let text = text
        .replace(",\"\"", "")
        .replace(",\"\",", ",")
        .replace(",\"\"}", "}")
        .replace("\\n", "\n");
    let text = TRAILING_COMMA.replace_all(&text, "$1");
    let text = NULL_SENTIMENT.replace_all(&text, "\"sentiment\": 50");
    WHITESPACE_RUN.replace_all(&text, " ").into_owned()
}

fn accepted(obj: &Map<String, Value>) -> Reply {
    let summary = obj.get("summary").map(value_text).unwrap_or_default();
    let mut response = obj.get("response").map(value_text).unwrap_or_default();

    // A response that is itself an object reads better as labelled paragraphs.
    if response.starts_with('{') && response.ends_with('}') {
        if let Ok(Value::Object(nested)) = serde_json::from_str::<Value>(&response) {
            response = nested
                .iter()
                .map(|(k, v)| format!("**{k}:** {}", value_text(v)))
                .collect::<Vec<_>>()
                .join("\n\n");
        }
    }

    Reply { summary, response }
}

/// Keep the prose lines of an unstructured answer, joined into one paragraph.
fn prose_response(raw: &str) -> String {
    let text = raw
        .trim()
        .lines()
        .filter(|line| {
            !line.trim().is_empty()
                && !line.starts_with('{')
                && !line.starts_with("User:")
                && !line.starts_with("Assistant:")
        })
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() { NO_RESPONSE.to_string() } else { text }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

/// Lenient parse for output produced in JSON mode.
///
/// Whole text, then the `{…}` span, then the two string fields by pattern
/// (defaults: [`NO_SUMMARY`] and the raw text). Always yields a JSON value.
pub fn try_parse_json(raw: &str) -> Value {
    let trimmed = raw.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => return v,
        Err(e) => warn!(error = %e, raw = ?raw, "JSON-mode output did not parse"),
    }

    if let Some(span) = brace_span(trimmed) {
        match serde_json::from_str::<Value>(span) {
            Ok(v) => return v,
            Err(e) => warn!(error = %e, extracted = ?span, "extracted JSON did not parse"),
        }
    }

    serde_json::json!({
        "summary": capture(&SUMMARY_FIELD_CI, raw).unwrap_or_else(|| NO_SUMMARY.to_string()),
        "response": capture(&RESPONSE_FIELD_CI, raw).unwrap_or_else(|| raw.to_string()),
    })
}
