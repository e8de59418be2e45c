//! Domain layer for deliberation
//!
//! This crate contains the pure types and algorithms of the deliberation
//! core. It performs no I/O and has no dependencies on the application,
//! infrastructure or presentation layers.
//!
//! # Core Concepts
//!
//! ## Pipelines
//!
//! A run is an ordered sequence of phases. Each phase fans out one call per
//! participant, fans the responses back in, and reduces them into the value
//! handed to the next phase. The result is an immutable [`PipelineRun`].
//!
//! ## Extraction
//!
//! Engine output is free text. [`extraction::extract`] recovers the JSON
//! object or array inside it, returning a typed [`ParseError`] instead of
//! failing so each phase can apply its own fallback.
//!
//! ## Aggregation
//!
//! Composite ranking, quartile selection, self-excluding round-robin
//! assignment, tie-inclusive vote tallies, dispersion statistics and Borda
//! counts. See [`aggregation`].
//!
//! ## Escalation
//!
//! A three-tier, confidence-gated state machine. See [`escalation`].

pub mod aggregation;
pub mod call;
pub mod catalog;
pub mod core;
pub mod escalation;
pub mod extraction;
pub mod pipeline;
pub mod prompt;
pub mod scoring;
pub mod util;

// Re-export commonly used types
pub use aggregation::{
    Assignment, BordaResult, DEFAULT_CONVERGENCE_RATIO, DispersionStats, RankedBallot, RoundRobinAssigner, Target, VoteTally,
    borda_count, mark_top_quartile, match_option, quartile_count, rank_items,
};
pub use call::{AttributedResponse, CallStatus, ModelTier, RemoteRequest, RemoteResponse};
pub use catalog::{CapabilityCard, CostTier, routing_summary};
pub use core::{error::DomainError, participant::Participant, topic::Topic};
pub use escalation::{
    ConfidenceVerdict, EscalationRun, EscalationThresholds, OversightVerdict, SynthesisVerdict,
    Tier, TierResult,
};
pub use extraction::{
    Expected, ParseError, ParsedPayload, PayloadKind, extract, extract_as, section, sections,
};
pub use pipeline::{Extraction, PhaseOutput, PhaseRecord, PipelineRun, ResponseShape};
pub use prompt::PromptTemplate;
pub use scoring::{
    CompositeStrategy, ItemAggregates, RubricScale, ScoreCard, ScoreRejected, ScoredItem,
};
