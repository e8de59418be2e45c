//! Reasoning engine port
//!
//! Defines the interface for the remote generative reasoning service.

use async_trait::async_trait;
use deliberation_domain::RemoteRequest;
use thiserror::Error;

/// Errors that can occur during a reasoning engine call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Engine returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Timeout")]
    Timeout,

    #[error("Engine returned no text")]
    EmptyResponse,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to the reasoning engine
///
/// One call, one answer. Implementations must not retry internally; retry
/// policy belongs to callers. Implementations (adapters) live in the
/// infrastructure layer.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Complete `request` with the given model id and return the text.
    ///
    /// The persona, if any, is the system prompt. When
    /// `request.reasoning_budget` is set the engine should enable extended
    /// thinking with that budget and allow
    /// [`RemoteRequest::max_output_tokens`] in total.
    async fn complete(&self, model: &str, request: &RemoteRequest) -> Result<String, EngineError>;
}
