//! Phase pipeline
//!
//! Runs named phases strictly in order. Each phase builds one request per
//! participant from the context so far, fans the calls out through a
//! [`TaskGroup`], extracts structured data from every response and reduces
//! the outputs into the value later phases see.
//!
//! A reducer that fails either aborts the run or is replaced by a default,
//! as the phase's [`FailurePolicy`] says.

use super::remote_call::RemoteCallExecutor;
use super::task_group::TaskGroup;
use crate::ports::progress::ProgressNotifier;
use crate::ports::trace_logger::{NoTraceLogger, TraceEvent, TraceLogger};
use chrono::Utc;
use deliberation_domain::{
    DomainError, Extraction, ModelTier, Participant, PhaseOutput, PhaseRecord, PipelineRun,
    RemoteRequest, ResponseShape, Topic,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Phase '{phase}' aborted: {reason}")]
    PhaseAborted { phase: String, reason: String },

    #[error("No participants configured")]
    NoParticipants,

    #[error("Phase '{0}' already ran in this pipeline")]
    DuplicatePhase(String),

    /// Returned by reducers; turned into `PhaseAborted` or a default by
    /// the phase's failure policy
    #[error("{0}")]
    Reduce(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl PipelineError {
    pub fn reduce(reason: impl Into<String>) -> Self {
        PipelineError::Reduce(reason.into())
    }
}

/// What happens when a phase's reducer fails
#[derive(Debug, Clone, PartialEq)]
pub enum FailurePolicy {
    /// The phase is load-bearing: abort the run
    Abort,
    /// Continue with this value and mark the phase as defaulted
    Substitute(Value),
}

/// Builds the prompt for one participant from the context so far
pub type RequestBuilder = Arc<dyn Fn(&PhaseContext, &Participant) -> String + Send + Sync>;

/// Reduces a phase's outputs into the value handed to later phases
pub type Reducer =
    Arc<dyn Fn(&PhaseContext, &[PhaseOutput]) -> Result<Value, PipelineError> + Send + Sync>;

/// Declaration of one phase
#[derive(Clone)]
pub struct PhaseSpec {
    name: String,
    participants: Option<Vec<Participant>>,
    tier: ModelTier,
    token_budget: u32,
    reasoning_budget: Option<u32>,
    shape: ResponseShape,
    request: RequestBuilder,
    reducer: Reducer,
    on_failure: FailurePolicy,
}

impl PhaseSpec {
    /// A phase over every run participant, reduced with [`collect_outputs`]
    /// and aborting on reducer failure.
    pub fn new(
        name: impl Into<String>,
        tier: ModelTier,
        token_budget: u32,
        shape: ResponseShape,
        request: impl Fn(&PhaseContext, &Participant) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            participants: None,
            tier,
            token_budget,
            reasoning_budget: None,
            shape,
            request: Arc::new(request),
            reducer: Arc::new(collect_outputs),
            on_failure: FailurePolicy::Abort,
        }
    }

    pub fn with_reducer(
        mut self,
        reducer: impl Fn(&PhaseContext, &[PhaseOutput]) -> Result<Value, PipelineError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.reducer = Arc::new(reducer);
        self
    }

    /// Restrict the phase to a subset of participants (may be empty)
    pub fn with_participants(mut self, participants: Vec<Participant>) -> Self {
        self.participants = Some(participants);
        self
    }

    pub fn with_reasoning_budget(mut self, budget: u32) -> Self {
        self.reasoning_budget = Some(budget);
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn build_request(&self, prompt: String, participant: &Participant) -> RemoteRequest {
        let request = match self.tier {
            ModelTier::Cheap => RemoteRequest::cheap(prompt, self.token_budget),
            ModelTier::Deep => RemoteRequest::deep(prompt, self.token_budget),
        }
        .with_persona(participant.persona());
        match self.reasoning_budget {
            Some(budget) => request.with_reasoning_budget(budget),
            None => request,
        }
    }
}

/// Default reducer: one `{participant, value, failed}` entry per output.
///
/// `value` is the parsed JSON, the raw text for raw phases, or null.
pub fn collect_outputs(
    _ctx: &PhaseContext,
    outputs: &[PhaseOutput],
) -> Result<Value, PipelineError> {
    let entries: Vec<Value> = outputs
        .iter()
        .map(|o| {
            let value = match &o.extraction {
                Extraction::Parsed { payload } => payload.value.clone(),
                Extraction::Raw { text } => Value::String(text.clone()),
                _ => Value::Null,
            };
            json!({
                "participant": o.participant.id(),
                "value": value,
                "failed": o.extraction.is_failure(),
            })
        })
        .collect();
    Ok(Value::Array(entries))
}

/// What a phase can see when building requests and reducing
#[derive(Debug, Clone)]
pub struct PhaseContext {
    run_id: String,
    topic: Topic,
    participants: Vec<Participant>,
    outputs: Vec<(String, Value)>,
}

impl PhaseContext {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Merged output of a completed phase
    pub fn output(&self, phase: &str) -> Option<&Value> {
        self.outputs
            .iter()
            .find(|(name, _)| name == phase)
            .map(|(_, v)| v)
    }

    /// Merged output of the most recent phase
    pub fn latest(&self) -> Option<&Value> {
        self.outputs.last().map(|(_, v)| v)
    }
}

/// A pipeline run in progress
pub struct PipelineSession {
    run: PipelineRun,
    context: PhaseContext,
    started: Instant,
}

impl PipelineSession {
    pub fn context(&self) -> &PhaseContext {
        &self.context
    }

    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    /// Override the final output (defaults to the last phase's value)
    pub fn set_output(&mut self, output: Value) {
        self.run.set_output(output);
    }

    /// Stamp the total elapsed time and hand back the run
    pub fn finish(mut self) -> PipelineRun {
        self.run.finish(self.started.elapsed());
        self.run
    }
}

/// Drives phases through a [`TaskGroup`]
pub struct PhasePipeline {
    group: TaskGroup,
    trace: Arc<dyn TraceLogger>,
}

impl PhasePipeline {
    pub fn new(executor: RemoteCallExecutor) -> Self {
        Self {
            group: TaskGroup::new(executor),
            trace: Arc::new(NoTraceLogger),
        }
    }

    /// Create with a trace logger (shared with the task group).
    pub fn with_trace_logger(mut self, trace: Arc<dyn TraceLogger>) -> Self {
        self.group = self.group.with_trace_logger(trace.clone());
        self.trace = trace;
        self
    }

    /// Open a run: validates the participant set and assigns a run id.
    pub fn start(
        &self,
        topic: Topic,
        participants: Vec<Participant>,
    ) -> Result<PipelineSession, PipelineError> {
        Participant::validate_set(&participants).map_err(|e| match e {
            DomainError::NoParticipants => PipelineError::NoParticipants,
            other => PipelineError::Domain(other),
        })?;

        let run_id = Uuid::new_v4().to_string();
        info!(
            "Starting run {} with {} participants",
            run_id,
            participants.len()
        );
        Ok(PipelineSession {
            run: PipelineRun::new(run_id.clone(), topic.clone()),
            context: PhaseContext {
                run_id,
                topic,
                participants,
                outputs: Vec::new(),
            },
            started: Instant::now(),
        })
    }

    /// Run one phase to completion and record it.
    ///
    /// Returns the merged value, which later phases also see through
    /// [`PhaseContext::output`].
    pub async fn run_phase(
        &self,
        session: &mut PipelineSession,
        spec: &PhaseSpec,
        progress: &dyn ProgressNotifier,
    ) -> Result<Value, PipelineError> {
        if session.run.phase(&spec.name).is_some() {
            return Err(PipelineError::DuplicatePhase(spec.name.clone()));
        }

        let participants = spec
            .participants
            .clone()
            .unwrap_or_else(|| session.context.participants.clone());
        info!("Phase {}: {} calls", spec.name, participants.len());
        progress.on_phase_start(&spec.name, participants.len());

        let started_at = Utc::now();
        let started = Instant::now();

        let tasks: Vec<(Participant, RemoteRequest)> = participants
            .iter()
            .map(|p| {
                let prompt = (spec.request)(&session.context, p);
                (p.clone(), spec.build_request(prompt, p))
            })
            .collect();

        let responses = self
            .group
            .run_all(&session.context.run_id, &spec.name, tasks, progress)
            .await;

        let outputs: Vec<PhaseOutput> = responses
            .into_iter()
            .map(|r| {
                let extraction = Extraction::from_response(&r.response, spec.shape);
                if let Extraction::ParseFailed { raw } = &extraction {
                    warn!(
                        "{} in phase {}: no structured data in {} chars",
                        r.participant,
                        spec.name,
                        raw.len()
                    );
                }
                PhaseOutput::new(r.participant, extraction)
            })
            .collect();

        let (merged, defaulted) = match (spec.reducer)(&session.context, &outputs) {
            Ok(value) => (value, false),
            Err(e) => match &spec.on_failure {
                FailurePolicy::Abort => {
                    warn!("Phase {} aborted: {}", spec.name, e);
                    progress.on_phase_complete(&spec.name);
                    return Err(PipelineError::PhaseAborted {
                        phase: spec.name.clone(),
                        reason: e.to_string(),
                    });
                }
                FailurePolicy::Substitute(default) => {
                    warn!("Phase {} using default: {}", spec.name, e);
                    (default.clone(), true)
                }
            },
        };

        let record = PhaseRecord {
            name: spec.name.clone(),
            started_at,
            duration: started.elapsed(),
            outputs,
            merged: merged.clone(),
            defaulted,
        };
        self.trace.log(TraceEvent::phase(
            &session.context.run_id,
            &record.name,
            record.duration,
            &record.failed_participants(),
            defaulted,
        ));

        session
            .context
            .outputs
            .push((spec.name.clone(), merged.clone()));
        session.run.push_phase(record);
        progress.on_phase_complete(&spec.name);

        Ok(merged)
    }

    /// Run a fixed list of phases in order
    pub async fn run(
        &self,
        topic: Topic,
        participants: Vec<Participant>,
        phases: &[PhaseSpec],
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineRun, PipelineError> {
        let mut session = self.start(topic, participants)?;
        for spec in phases {
            self.run_phase(&mut session, spec, progress).await?;
        }
        Ok(session.finish())
    }
}
