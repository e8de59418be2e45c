//! Typed payloads returned by the cheap-tier evaluation calls.
//!
//! Each verdict is read field by field from whatever object the engine
//! returned. Missing, malformed or absent fields take conservative defaults
//! (zero confidence, zero consensus, failed safety check) so an unreadable
//! evaluation escalates instead of being accepted.

use crate::extraction::{Expected, extract};
use crate::util::number_like;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn object_from(text: &str) -> Value {
    extract(text, Expected::Object)
        .map(|p| p.value)
        .unwrap_or(Value::Null)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Clamp an engine-reported 0-100 confidence
fn percent(value: &Value, key: &str) -> u8 {
    value
        .get(key)
        .and_then(number_like)
        .map(|n| n.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

/// T1 evaluator output: `{confidence, reasoning}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceVerdict {
    pub confidence: u8,
    pub reasoning: String,
}

impl ConfidenceVerdict {
    pub fn from_text(text: &str) -> Self {
        let v = object_from(text);
        Self {
            confidence: percent(&v, "confidence"),
            reasoning: string_field(&v, "reasoning").unwrap_or_default(),
        }
    }
}

/// T2 synthesizer output: `{synthesis, consensus_score, reasoning}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisVerdict {
    pub synthesis: String,
    /// 0.0-1.0
    pub consensus_score: f64,
    pub reasoning: String,
}

impl SynthesisVerdict {
    pub fn from_text(text: &str) -> Self {
        let v = object_from(text);
        Self {
            synthesis: string_field(&v, "synthesis").unwrap_or_default(),
            consensus_score: v
                .get("consensus_score")
                .and_then(number_like)
                .filter(|n| n.is_finite())
                .map(|n| n.clamp(0.0, 1.0))
                .unwrap_or(0.0),
            reasoning: string_field(&v, "reasoning").unwrap_or_default(),
        }
    }

    /// Consensus expressed on the 0-100 confidence scale
    pub fn confidence(&self) -> u8 {
        (self.consensus_score * 100.0).round() as u8
    }
}

/// T3 oversight output:
/// `{passes_safety_check, final_response, flag_reason, confidence}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OversightVerdict {
    pub passes_safety_check: bool,
    /// `None` when the overseer gave no response; callers fall back to the
    /// T2 synthesis
    pub final_response: Option<String>,
    pub flag_reason: Option<String>,
    pub confidence: u8,
}

impl OversightVerdict {
    pub fn from_text(text: &str) -> Self {
        let v = object_from(text);
        Self {
            passes_safety_check: v
                .get("passes_safety_check")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            final_response: string_field(&v, "final_response").filter(|s| !s.trim().is_empty()),
            flag_reason: string_field(&v, "flag_reason").filter(|s| !s.trim().is_empty()),
            confidence: percent(&v, "confidence"),
        }
    }

    pub fn final_response_or(&self, fallback: &str) -> String {
        self.final_response
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Flag reason to report: only when the check failed
    pub fn reported_flag_reason(&self) -> Option<String> {
        if self.passes_safety_check {
            None
        } else {
            Some(
                self.flag_reason
                    .clone()
                    .unwrap_or_else(|| "oversight did not pass the safety check".to_string()),
            )
        }
    }
}
