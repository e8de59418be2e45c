//! In-memory engine fakes shared by use case tests.

use crate::ports::reasoning_engine::{EngineError, ReasoningEngine};
use async_trait::async_trait;
use deliberation_domain::RemoteRequest;
use std::sync::Mutex;
use std::time::Duration;

type Responder = dyn Fn(&str, &RemoteRequest) -> Result<String, EngineError> + Send + Sync;

/// Engine whose answers come from a closure, recording every call
pub struct ScriptedEngine {
    respond: Box<Responder>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, RemoteRequest)>>,
}

impl ScriptedEngine {
    pub fn new(
        respond: impl Fn(&str, &RemoteRequest) -> Result<String, EngineError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same text
    pub fn constant(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn complete(&self, model: &str, request: &RemoteRequest) -> Result<String, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(model, request)
    }
}
