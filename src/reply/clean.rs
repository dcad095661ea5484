//! Final normalisation of a parsed reply before it leaves the server.

use serde_json::Value;

use super::{Reply, looks_like_json_container, spaced_json, value_text};

/// Normalise a parsed `{summary, response}` value into a [`Reply`].
///
/// Surrounding quotes are trimmed from both fields, literal `\n` `\"` `\t`
/// sequences in the response are unescaped, and a response that is itself
/// JSON is re-serialised on one line with `", "` / `": "` separators and its
/// keys in their original order. A value that is not an object carries no
/// summary; its text becomes the response.
pub fn clean_reply(parsed: &Value) -> Reply {
    let Value::Object(obj) = parsed else {
        return Reply::new("", value_text(parsed));
    };

    let summary = match obj.get("summary") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim_matches('"').to_string(),
        Some(other) => other.to_string(),
    };

    let response = match obj.get("response") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => clean_response_text(s),
        Some(other) => spaced_json(other),
    };

    Reply { summary, response }
}

fn clean_response_text(raw: &str) -> String {
    let text = raw
        .trim()
        .trim_matches('"')
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\t", "\t");

    if looks_like_json_container(&text) {
        return serde_json::from_str::<Value>(&text)
            .map(|v| spaced_json(&v))
            .unwrap_or(text);
    }
    text.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_fields_pass_through() {
        let r = clean_reply(&json!({"summary": "S", "response": "R"}));
        assert_eq!(r, Reply::new("S", "R"));
    }

    #[test]
    fn quotes_are_trimmed() {
        let r = clean_reply(&json!({"summary": "\"S\"", "response": "  \"\"R\"\"  "}));
        assert_eq!(r, Reply::new("S", "R"));
    }

    #[test]
    fn literal_escapes_are_unescaped() {
        let r = clean_reply(&json!({"summary": "s", "response": "line1\\nline2\\tsay \\\"hi\\\" now"}));
        assert_eq!(r.response, "line1\nline2\tsay \"hi\" now");
    }

    #[test]
    fn embedded_json_is_normalised() {
        let r = clean_reply(&json!({"summary": "s", "response": "{ \"a\" :[1,2] }"}));
        assert_eq!(r.response, r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn embedded_json_keeps_key_order() {
        let r = clean_reply(&json!({"summary": "s", "response": "{\"zeta\":1,\"alpha\":2}"}));
        assert_eq!(r.response, r#"{"zeta": 1, "alpha": 2}"#);
    }

    #[test]
    fn escaped_embedded_json_is_unescaped_then_normalised() {
        let r = clean_reply(&json!({"summary": "s", "response": "{\\\"a\\\": 1}"}));
        assert_eq!(r.response, r#"{"a": 1}"#);
    }

    #[test]
    fn object_response_is_serialised() {
        let r = clean_reply(&json!({"summary": "s", "response": {"k": "v", "b": [1, 2]}}));
        assert_eq!(r.response, r#"{"k": "v", "b": [1, 2]}"#);
    }

    #[test]
    fn missing_and_null_fields_are_empty() {
        let r = clean_reply(&json!({"response": null}));
        assert_eq!(r, Reply::new("", ""));
    }

    #[test]
    fn non_object_becomes_response() {
        let r = clean_reply(&json!("just text"));
        assert_eq!(r, Reply::new("", "just text"));
    }
}
