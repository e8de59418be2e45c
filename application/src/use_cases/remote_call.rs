//! Remote call executor
//!
//! Issues exactly one reasoning request and reports the outcome as a
//! [`RemoteResponse`]. Failures become `status = error`; there is no retry.

use crate::config::ModelRoster;
use crate::ports::reasoning_engine::ReasoningEngine;
use deliberation_domain::{RemoteRequest, RemoteResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Executes single remote calls against a [`ReasoningEngine`]
#[derive(Clone)]
pub struct RemoteCallExecutor {
    engine: Arc<dyn ReasoningEngine>,
    models: ModelRoster,
}

impl RemoteCallExecutor {
    pub fn new(engine: Arc<dyn ReasoningEngine>, models: ModelRoster) -> Self {
        Self { engine, models }
    }

    pub fn models(&self) -> &ModelRoster {
        &self.models
    }

    /// Issue `request` and wait for the engine.
    ///
    /// Latency is measured here around the engine call. An empty answer is
    /// reported as an error, since nothing downstream can use it.
    pub async fn call(&self, request: &RemoteRequest) -> RemoteResponse {
        let model = self.models.for_tier(request.model_tier);
        debug!(
            "Calling {} ({} tier, {} max tokens)",
            model,
            request.model_tier,
            request.max_output_tokens()
        );

        let started = Instant::now();
        let result = self.engine.complete(model, request).await;
        let latency = started.elapsed();

        match result {
            Ok(text) if !text.trim().is_empty() => RemoteResponse::ok(text, latency),
            Ok(_) => {
                warn!("{} returned an empty response", model);
                RemoteResponse::error("empty response", latency)
            }
            Err(e) => {
                warn!("{} call failed: {}", model, e);
                RemoteResponse::error(e.to_string(), latency)
            }
        }
    }
}
