//! JSON recovery from engine text.
//!
//! Strategies are tried in order and the first success wins:
//!
//! 1. the whole text, verbatim
//! 2. the interior of each ```` ``` ```` fenced block (optionally tagged `json`)
//! 3. the span from the first opening bracket to the last closing bracket
//!    of the expected kind
//!
//! Strategy 3 is greedy: with several JSON-looking fragments in one text it
//! can capture unrelated structure in between. Callers must tolerate a
//! partially wrong extraction.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The shape a caller expects to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expected {
    Object,
    Array,
}

impl Expected {
    fn brackets(self) -> (char, char) {
        match self {
            Expected::Object => ('{', '}'),
            Expected::Array => ('[', ']'),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Expected::Object => value.is_object(),
            Expected::Array => value.is_array(),
        }
    }
}

/// Kind of a successfully parsed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Object,
    Array,
}

/// Structured data recovered from engine text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPayload {
    pub kind: PayloadKind,
    pub value: Value,
}

impl ParsedPayload {
    fn from_value(expected: Expected, value: Value) -> Self {
        let kind = match expected {
            Expected::Object => PayloadKind::Object,
            Expected::Array => PayloadKind::Array,
        };
        Self { kind, value }
    }

    /// Look up a field when the payload is an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Deserialize the payload into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.value.clone())
    }
}

/// The text did not contain recoverable structured data
#[derive(Error, Debug, Clone, PartialEq)]
#[error("No {expected:?} found in response ({} chars)", .raw.len())]
pub struct ParseError {
    pub expected: Expected,
    pub raw: String,
}

/// Recover a JSON object or array of the expected kind from `text`.
///
/// # Examples
///
/// ```
/// use deliberation_domain::extraction::{extract, Expected};
///
/// let text = "Here is the result:\n```json\n[{\"id\":1}]\n```\nThanks";
/// let payload = extract(text, Expected::Array).unwrap();
/// assert_eq!(payload.value, serde_json::json!([{"id": 1}]));
///
/// assert!(extract("no json here", Expected::Object).is_err());
/// ```
pub fn extract(text: &str, expected: Expected) -> Result<ParsedPayload, ParseError> {
    let parse = |candidate: &str| -> Option<ParsedPayload> {
        serde_json::from_str::<Value>(candidate.trim())
            .ok()
            .filter(|v| expected.matches(v))
            .map(|v| ParsedPayload::from_value(expected, v))
    };

    if let Some(payload) = parse(text) {
        return Ok(payload);
    }

    for block in fenced_blocks(text) {
        if let Some(payload) = parse(block) {
            return Ok(payload);
        }
    }

    let (open, close) = expected.brackets();
    if let (Some(start), Some(end)) = (text.find(open), text.rfind(close))
        && start < end
        && let Some(payload) = parse(&text[start..=end])
    {
        return Ok(payload);
    }

    Err(ParseError {
        expected,
        raw: text.to_string(),
    })
}

/// [`extract`], then deserialize into `T`.
///
/// A payload of the right shape that does not fit `T` is reported as a
/// [`ParseError`] too, so callers have a single fallback path.
pub fn extract_as<T: DeserializeOwned>(text: &str, expected: Expected) -> Result<T, ParseError> {
    let payload = extract(text, expected)?;
    payload.decode().map_err(|_| ParseError {
        expected,
        raw: text.to_string(),
    })
}

/// Interiors of ```` ``` ```` fenced blocks, in order of appearance.
///
/// The info string after the opening fence (`json`, `JSON`, ...) is dropped.
/// An unterminated fence yields nothing.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let info = &after_fence[..body_start];
        // `{...}` on the same line as the fence has no info string to drop
        let body_start = if info.trim_start().starts_with(['{', '[']) {
            0
        } else {
            body_start
        };
        let body = &after_fence[body_start..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push(&body[..close]);
        rest = &body[close + 3..];
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verbatim_object() {
        let p = extract(r#"{"score": 4}"#, Expected::Object).unwrap();
        assert_eq!(p.kind, PayloadKind::Object);
        assert_eq!(p.value, json!({"score": 4}));
    }

    #[test]
    fn test_verbatim_with_whitespace() {
        let p = extract("\n  [1, 2, 3]  \n", Expected::Array).unwrap();
        assert_eq!(p.value, json!([1, 2, 3]));
    }

    #[test]
    fn test_fenced_json_array_in_prose() {
        let text = "Here is the result:\n```json\n[{\"id\":1}]\n```\nThanks";
        let p = extract(text, Expected::Array).unwrap();
        assert_eq!(p.kind, PayloadKind::Array);
        assert_eq!(p.value, json!([{"id": 1}]));
    }

    #[test]
    fn test_untagged_fence() {
        let text = "Result\n```\n{\"a\": true}\n```";
        let p = extract(text, Expected::Object).unwrap();
        assert_eq!(p.value, json!({"a": true}));
    }

    #[test]
    fn test_fence_skips_non_matching_block() {
        let text = "```text\nnot json\n```\nthen\n```json\n{\"ok\": 1}\n```";
        let p = extract(text, Expected::Object).unwrap();
        assert_eq!(p.value, json!({"ok": 1}));
    }

    #[test]
    fn test_bracket_span_in_prose() {
        let text = r#"Sure! My assessment is {"confidence": 72, "reasoning": "solid"} overall."#;
        let p = extract(text, Expected::Object).unwrap();
        assert_eq!(p.value["confidence"], 72);
    }

    #[test]
    fn test_nested_structure_roundtrip() {
        let original = json!({
            "clusters": [
                {"theme": "Pricing", "ideas": ["a", "b"]},
                {"theme": "Channels", "ideas": []}
            ],
            "meta": {"count": 2, "ok": true, "ratio": 0.5}
        });
        let text = format!(
            "Some preamble.\n\n{}\n\nAnd a closing remark.",
            serde_json::to_string_pretty(&original).unwrap()
        );
        assert_eq!(extract(&text, Expected::Object).unwrap().value, original);

        let fenced = format!("```json\n{}\n```", original);
        assert_eq!(extract(&fenced, Expected::Object).unwrap().value, original);
    }

    #[test]
    fn test_wrong_kind_is_not_accepted() {
        // Verbatim array parses, but the caller wants an object
        let err = extract("[1, 2]", Expected::Object).unwrap_err();
        assert_eq!(err.expected, Expected::Object);
        assert_eq!(err.raw, "[1, 2]");
    }

    #[test]
    fn test_greedy_span_over_captures() {
        // Two separate objects: first '{' to last '}' is not valid JSON
        let text = r#"{"a": 1} and also {"b": 2}"#;
        assert!(extract(text, Expected::Object).is_err());
    }

    #[test]
    fn test_failure_keeps_raw_text() {
        let err = extract("I could not decide.", Expected::Array).unwrap_err();
        assert_eq!(err.raw, "I could not decide.");
        assert!(err.to_string().contains("Array"));
    }

    #[test]
    fn test_unterminated_fence_falls_through_to_span() {
        let text = "```json\n{\"x\": 1}";
        assert_eq!(extract(text, Expected::Object).unwrap().value, json!({"x": 1}));
    }

    #[test]
    fn test_extract_as_typed() {
        #[derive(Deserialize)]
        struct Verdict {
            confidence: u8,
        }
        let v: Verdict = extract_as("```json\n{\"confidence\": 91}\n```", Expected::Object).unwrap();
        assert_eq!(v.confidence, 91);

        let bad = extract_as::<Verdict>(r#"{"confidence": "high"}"#, Expected::Object);
        assert!(bad.is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract("", Expected::Object).is_err());
        assert!(extract("", Expected::Array).is_err());
    }
}
