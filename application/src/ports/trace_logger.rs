//! Port for structured call tracing.
//!
//! Defines the [`TraceLogger`] trait for recording one event per remote call
//! and per completed phase to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable execution trace (JSONL) that can be analysed after the
//! run.

use deliberation_domain::util::preview;
use deliberation_domain::{CallStatus, ModelTier, Participant};
use serde_json::{Value, json};
use std::time::Duration;

/// Characters of response text kept in a call event
pub const PREVIEW_CHARS: usize = 500;

/// A structured trace event.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The timestamp is added by the logger.
pub struct TraceEvent {
    /// Event type identifier (`"call"` or `"phase"`).
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TraceEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// One remote call
    #[allow(clippy::too_many_arguments)]
    pub fn call(
        run_id: &str,
        phase: &str,
        participant: &Participant,
        tier: ModelTier,
        latency: Duration,
        status: CallStatus,
        text: &str,
        error: Option<&str>,
    ) -> Self {
        Self::new(
            "call",
            json!({
                "run_id": run_id,
                "phase": phase,
                "participant": participant.id(),
                "model_tier": tier,
                "latency_ms": latency.as_millis() as u64,
                "status": status,
                "response_preview": preview(text, PREVIEW_CHARS),
                "error": error,
            }),
        )
    }

    /// One completed phase
    pub fn phase(
        run_id: &str,
        phase: &str,
        duration: Duration,
        failed: &[&str],
        defaulted: bool,
    ) -> Self {
        Self::new(
            "phase",
            json!({
                "run_id": run_id,
                "phase": phase,
                "duration_ms": duration.as_millis() as u64,
                "failed_participants": failed,
                "defaulted": defaulted,
            }),
        )
    }
}

/// Port for logging trace events.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). `log` is synchronous and infallible so tracing never disrupts a
/// run; write failures are dropped.
pub trait TraceLogger: Send + Sync {
    /// Record a trace event.
    fn log(&self, event: TraceEvent);
}

/// No-op implementation for tests and when tracing is disabled.
pub struct NoTraceLogger;

impl TraceLogger for NoTraceLogger {
    fn log(&self, _event: TraceEvent) {}
}
