//! Application layer for deliberation
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{CallBudgets, DotVoteParams, ModelRoster, ScoringParams};
pub use ports::{
    progress::{NoProgress, ProgressNotifier},
    reasoning_engine::{EngineError, ReasoningEngine},
    trace_logger::{NoTraceLogger, TraceEvent, TraceLogger},
};
pub use use_cases::crowd_scoring::{CrowdScoringInput, CrowdScoringOutcome, CrowdScoringUseCase};
pub use use_cases::dot_vote::{DotVoteInput, DotVoteOutcome, DotVoteUseCase, Idea};
pub use use_cases::phase_pipeline::{
    FailurePolicy, PhaseContext, PhasePipeline, PhaseSpec, PipelineError, PipelineSession,
    collect_outputs,
};
pub use use_cases::remote_call::RemoteCallExecutor;
pub use use_cases::run_escalation::{
    EscalationError, EscalationInput, EscalationOutcome, RunEscalationUseCase,
};
pub use use_cases::task_group::TaskGroup;
