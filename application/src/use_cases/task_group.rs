//! Fan-out/fan-in task group
//!
//! Issues every call of a phase concurrently and waits for all of them.
//! A failed call never cancels its siblings and never fails the group: it
//! is reported in its own slot as `status = error`.

use super::remote_call::RemoteCallExecutor;
use crate::ports::progress::ProgressNotifier;
use crate::ports::trace_logger::{NoTraceLogger, TraceEvent, TraceLogger};
use deliberation_domain::{
    AttributedResponse, CallStatus, Participant, RemoteRequest, RemoteResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Runs batches of independent remote calls
#[derive(Clone)]
pub struct TaskGroup {
    executor: RemoteCallExecutor,
    trace: Arc<dyn TraceLogger>,
}

impl TaskGroup {
    pub fn new(executor: RemoteCallExecutor) -> Self {
        Self {
            executor,
            trace: Arc::new(NoTraceLogger),
        }
    }

    /// Create with a trace logger.
    pub fn with_trace_logger(mut self, trace: Arc<dyn TraceLogger>) -> Self {
        self.trace = trace;
        self
    }

    pub fn executor(&self) -> &RemoteCallExecutor {
        &self.executor
    }

    /// Run all `tasks` concurrently; the output has one entry per task, in
    /// input order, whatever the completion order was.
    pub async fn run_all(
        &self,
        run_id: &str,
        phase: &str,
        tasks: Vec<(Participant, RemoteRequest)>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<AttributedResponse> {
        let total = tasks.len();
        debug!("Fanning out {} calls for phase {}", total, phase);

        let mut slots: Vec<Option<AttributedResponse>> = vec![None; total];
        let mut participants = Vec::with_capacity(total);
        let mut join_set = JoinSet::new();

        for (index, (participant, request)) in tasks.into_iter().enumerate() {
            participants.push((participant.clone(), request.model_tier));
            let executor = self.executor.clone();
            join_set.spawn(async move {
                let response = executor.call(&request).await;
                (index, participant, request.model_tier, response)
            });
        }

        let mut join_failure = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, participant, tier, response)) => {
                    if !response.is_ok() {
                        warn!(
                            "{} failed in phase {}: {}",
                            participant,
                            phase,
                            response.error_detail.as_deref().unwrap_or("unknown error")
                        );
                    }
                    progress.on_task_complete(phase, &participant, response.is_ok());
                    self.trace.log(TraceEvent::call(
                        run_id,
                        phase,
                        &participant,
                        tier,
                        response.latency,
                        response.status,
                        &response.raw_text,
                        response.error_detail.as_deref(),
                    ));
                    slots[index] = Some(AttributedResponse {
                        participant,
                        response,
                    });
                }
                Err(e) => {
                    warn!("Task join error in phase {}: {}", phase, e);
                    join_failure = Some(e.to_string());
                }
            }
        }

        // A task that panicked or was cancelled still owns its slot.
        slots
            .into_iter()
            .zip(participants)
            .map(|(slot, (participant, tier))| {
                slot.unwrap_or_else(|| {
                    let detail = join_failure
                        .clone()
                        .unwrap_or_else(|| "task did not complete".to_string());
                    progress.on_task_complete(phase, &participant, false);
                    self.trace.log(TraceEvent::call(
                        run_id,
                        phase,
                        &participant,
                        tier,
                        Duration::ZERO,
                        CallStatus::Error,
                        "",
                        Some(&detail),
                    ));
                    AttributedResponse {
                        participant,
                        response: RemoteResponse::error(detail, Duration::ZERO),
                    }
                })
            })
            .collect()
    }
}
