//! Progress notification port
//!
//! Defines the interface for reporting progress while a pipeline runs.

use deliberation_domain::{Participant, Tier, TierResult};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &str, total_tasks: usize);

    /// Called when a participant's call within a phase completes
    fn on_task_complete(&self, phase: &str, participant: &Participant, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &str);

    // ==================== Escalation Callbacks ====================

    /// Called when an escalation tier starts
    fn on_tier_start(&self, _tier: Tier) {}

    /// Called when a tier finishes; `accepted` is false when the run escalates
    fn on_tier_complete(&self, _result: &TierResult, _accepted: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &str, _total_tasks: usize) {}
    fn on_task_complete(&self, _phase: &str, _participant: &Participant, _success: bool) {}
    fn on_phase_complete(&self, _phase: &str) {}
}
