//! Reasoning engine providers.
//!
//! Implementations of the [`ReasoningEngine`](deliberation_application::ReasoningEngine)
//! port. Only the Anthropic Messages API is supported.

mod anthropic;

pub use anthropic::AnthropicEngine;
