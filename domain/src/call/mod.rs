//! Remote call value objects.
//!
//! A [`RemoteRequest`] is built per call and consumed once by the executor;
//! a [`RemoteResponse`] is what comes back. Most upstream logic only reads
//! [`RemoteResponse::raw_text`].

use crate::core::participant::Participant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which class of model serves a call
///
/// Bulk mechanical transformation (scoring, evaluation, synthesis of
/// structured data) goes to the cheap tier; creative or strategic reasoning
/// goes to the deep tier, usually with a reasoning budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Cheap,
    Deep,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Cheap => "cheap",
            ModelTier::Deep => "deep",
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One request to the reasoning engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    pub model_tier: ModelTier,
    /// Maximum output tokens
    pub token_budget: u32,
    /// Extended "thinking" budget, deep tier only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_budget: Option<u32>,
}

impl RemoteRequest {
    /// A cheap-tier request with no reasoning budget
    pub fn cheap(prompt: impl Into<String>, token_budget: u32) -> Self {
        Self {
            prompt: prompt.into(),
            persona: None,
            model_tier: ModelTier::Cheap,
            token_budget,
            reasoning_budget: None,
        }
    }

    /// A deep-tier request
    pub fn deep(prompt: impl Into<String>, token_budget: u32) -> Self {
        Self {
            prompt: prompt.into(),
            persona: None,
            model_tier: ModelTier::Deep,
            token_budget,
            reasoning_budget: None,
        }
    }

    pub fn with_persona(mut self, persona: Option<&str>) -> Self {
        self.persona = persona.map(str::to_string);
        self
    }

    pub fn with_reasoning_budget(mut self, budget: u32) -> Self {
        self.reasoning_budget = Some(budget);
        self
    }

    /// Total output tokens the engine must allow: the visible budget plus
    /// any reasoning budget, which counts against the same limit.
    /// Saturates at `u32::MAX`.
    pub fn max_output_tokens(&self) -> u32 {
        self.token_budget
            .saturating_add(self.reasoning_budget.unwrap_or(0))
    }
}

/// Outcome of a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Error,
}

/// Response from one remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// Text returned by the engine; empty on error
    pub raw_text: String,
    #[serde(with = "crate::util::duration_millis")]
    pub latency: Duration,
    pub status: CallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl RemoteResponse {
    pub fn ok(raw_text: impl Into<String>, latency: Duration) -> Self {
        Self {
            raw_text: raw_text.into(),
            latency,
            status: CallStatus::Ok,
            error_detail: None,
        }
    }

    pub fn error(detail: impl Into<String>, latency: Duration) -> Self {
        Self {
            raw_text: String::new(),
            latency,
            status: CallStatus::Error,
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CallStatus::Ok
    }
}

/// A response attributed to the participant it was issued for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedResponse {
    pub participant: Participant,
    pub response: RemoteResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_output_tokens_includes_reasoning() {
        let req = RemoteRequest::deep("q", 4096).with_reasoning_budget(10_000);
        assert_eq!(req.max_output_tokens(), 14_096);
        assert_eq!(RemoteRequest::cheap("q", 256).max_output_tokens(), 256);
    }

    #[test]
    fn test_max_output_tokens_saturates() {
        let req = RemoteRequest::deep("q", u32::MAX - 5).with_reasoning_budget(10_000);
        assert_eq!(req.max_output_tokens(), u32::MAX);
    }

    #[test]
    fn test_response_constructors() {
        let ok = RemoteResponse::ok("hi", Duration::from_millis(5));
        assert!(ok.is_ok());
        assert!(ok.error_detail.is_none());

        let err = RemoteResponse::error("boom", Duration::ZERO);
        assert!(!err.is_ok());
        assert!(err.raw_text.is_empty());
        assert_eq!(err.error_detail.as_deref(), Some("boom"));
    }

    #[test]
    fn test_response_serializes_latency_as_millis() {
        let ok = RemoteResponse::ok("x", Duration::from_millis(1500));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["latency"], 1500);
        assert_eq!(value["status"], "ok");
    }
}
