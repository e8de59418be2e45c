//! Per-participant phase output

use crate::call::RemoteResponse;
use crate::core::participant::Participant;
use crate::extraction::{Expected, ParsedPayload, extract};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a phase expects back from each participant call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    Object,
    Array,
    /// Free text, no extraction
    Raw,
}

impl ResponseShape {
    pub fn expected(&self) -> Option<Expected> {
        match self {
            ResponseShape::Object => Some(Expected::Object),
            ResponseShape::Array => Some(Expected::Array),
            ResponseShape::Raw => None,
        }
    }
}

/// Result of interpreting one participant's response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Extraction {
    Parsed { payload: ParsedPayload },
    Raw { text: String },
    /// The call succeeded but no structured data could be recovered
    ParseFailed { raw: String },
    CallFailed { error: String },
}

impl Extraction {
    /// Interpret a response according to the shape the phase expects
    pub fn from_response(response: &RemoteResponse, shape: ResponseShape) -> Self {
        if !response.is_ok() {
            return Extraction::CallFailed {
                error: response
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            };
        }
        match shape.expected() {
            None => Extraction::Raw {
                text: response.raw_text.clone(),
            },
            Some(expected) => match extract(&response.raw_text, expected) {
                Ok(payload) => Extraction::Parsed { payload },
                Err(e) => Extraction::ParseFailed { raw: e.raw },
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Extraction::ParseFailed { .. } | Extraction::CallFailed { .. }
        )
    }

    /// Parsed JSON, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            Extraction::Parsed { payload } => Some(&payload.value),
            _ => None,
        }
    }

    /// Raw text for `Raw` outputs; the unparsed text for parse failures
    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Raw { text } => Some(text),
            Extraction::ParseFailed { raw } => Some(raw),
            _ => None,
        }
    }
}

/// One participant's contribution to a phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutput {
    pub participant: Participant,
    pub extraction: Extraction,
}

impl PhaseOutput {
    pub fn new(participant: Participant, extraction: Extraction) -> Self {
        Self {
            participant,
            extraction,
        }
    }
}
