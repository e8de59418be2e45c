//! Shared utility functions.

use serde_json::Value;

/// First `max_chars` characters of `s`, never splitting a UTF-8 character.
///
/// Returns a sub-slice of the original string, unchanged when it is short
/// enough.
pub fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Read a number the engine may have written as a JSON number or as a
/// numeric string ("4", " 85 "). Non-finite values ("NaN", "inf") are
/// treated as missing.
pub fn number_like(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Serialize a `Duration` as whole milliseconds
pub mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Serialize a `Duration` as fractional seconds
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_ascii() {
        assert_eq!(preview("hello world", 5), "hello");
    }

    #[test]
    fn preview_no_op_when_short() {
        assert_eq!(preview("hi", 10), "hi");
        assert_eq!(preview("", 10), "");
    }

    #[test]
    fn preview_counts_characters() {
        let s = "あのね"; // 3 chars, 9 bytes
        assert_eq!(preview(s, 1), "あ");
        assert_eq!(preview(s, 2), "あの");
        assert_eq!(preview(s, 3), "あのね");
    }

    #[test]
    fn number_like_variants() {
        assert_eq!(number_like(&json!(4)), Some(4.0));
        assert_eq!(number_like(&json!(0.75)), Some(0.75));
        assert_eq!(number_like(&json!(" 85 ")), Some(85.0));
        assert_eq!(number_like(&json!("high")), None);
        assert_eq!(number_like(&json!(null)), None);
    }

    #[test]
    fn number_like_rejects_non_finite() {
        assert_eq!(number_like(&json!("NaN")), None);
        assert_eq!(number_like(&json!(" inf ")), None);
        assert_eq!(number_like(&json!("-infinity")), None);
    }

    #[test]
    fn duration_millis_whole_milliseconds() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Timed {
            #[serde(with = "duration_millis")]
            took: std::time::Duration,
        }
        let timed = Timed {
            took: std::time::Duration::from_micros(2_750),
        };
        let value = serde_json::to_value(&timed).unwrap();
        assert_eq!(value, json!({"took": 2}));
        let back: Timed = serde_json::from_value(json!({"took": 40})).unwrap();
        assert_eq!(back.took, std::time::Duration::from_millis(40));
    }
}
