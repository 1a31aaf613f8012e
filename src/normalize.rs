//! Normalization of raw model output.
//!
//! Models are asked for JSON but are not bound to produce it, so decoding is
//! an expected-to-fail operation: [`try_decode`] reports failure as a value
//! and [`normalize`] folds it into an [`Normalized::Unstructured`] fallback.

use crate::error::DecodeError;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use tracing::debug;

/// A whole-response code fence: optional `json` tag, body, closing fence.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?i:json)?[ \t]*\r?\n?(.*?)\s*```$").expect("Invalid regex")
});

/// Outcome of normalizing a model response against an expected shape `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    /// The response decoded into the expected shape.
    Structured(T),
    /// Anything else, carried as the trimmed response text.
    Unstructured(String),
}

/// Trim `raw` and drop a code fence wrapping the whole response.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    CODE_FENCE
        .captures(trimmed)
        .and_then(|cap| cap.get(1))
        .map_or(trimmed, |body| body.as_str().trim())
}

/// Strictly decode `raw` as `T` after fence stripping.
pub fn try_decode<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(strip_code_fence(raw))?)
}

/// Decode `raw` as `T`, falling back to the trimmed text.
pub fn normalize<T: DeserializeOwned>(raw: &str) -> Normalized<T> {
    match try_decode(raw) {
        Ok(value) => Normalized::Structured(value),
        Err(err) => {
            debug!(error = %err, "response kept as plain text");
            Normalized::Unstructured(raw.trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        strategy: Value,
        #[serde(rename = "pineScript")]
        pine_script: String,
    }

    #[test]
    fn test_strip_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_bare_fence_and_whitespace() {
        let raw = "  \n```\n[1, 2]\n```\n ";
        assert_eq!(strip_code_fence(raw), "[1, 2]");
    }

    #[test]
    fn test_fence_without_newlines() {
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_unfenced_text_only_trimmed() {
        assert_eq!(strip_code_fence("  hello  "), "hello");
        // A fence that does not wrap the whole response is left alone.
        let raw = "Here you go:\n```json\n{}\n```";
        assert_eq!(strip_code_fence(raw), raw);
    }

    #[test]
    fn test_fenced_json_equals_inner_decode() {
        let inner = r#"{"entryConditions": ["RSI < 30"], "nested": {"x": [1, 2.5, null]}}"#;
        let raw = format!("```json\n{inner}\n```");

        let expected: Value = serde_json::from_str(inner).unwrap();
        assert_eq!(normalize::<Value>(&raw), Normalized::Structured(expected));
    }

    #[test]
    fn test_prose_is_unstructured_trimmed() {
        let raw = "\n  Sure! An RSI strategy buys when momentum is oversold.  \n";
        assert_eq!(
            normalize::<Value>(raw),
            Normalized::Unstructured(raw.trim().to_string())
        );
    }

    #[test]
    fn test_wrong_shape_is_unstructured() {
        let raw = r#"{"strategy": {"name": "x"}}"#;
        assert_eq!(
            normalize::<Pair>(raw),
            Normalized::Unstructured(raw.to_string())
        );
    }

    #[test]
    fn test_expected_shape_is_structured() {
        let raw = r#"```json
{"strategy": {"name": "RSI dip"}, "pineScript": "//@version=5"}
```"#;
        assert_eq!(
            normalize::<Pair>(raw),
            Normalized::Structured(Pair {
                strategy: json!({"name": "RSI dip"}),
                pine_script: "//@version=5".into(),
            })
        );
    }

    #[test]
    fn test_try_decode_reports_failure() {
        assert!(try_decode::<Value>("not json at all").is_err());
        assert!(try_decode::<Value>("").is_err());
    }
}
