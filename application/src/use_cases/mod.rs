//! Use cases
//!
//! The call machinery (executor, task group, phase pipeline) and the
//! orchestrations built on it.

pub mod crowd_scoring;
pub mod dot_vote;
pub mod phase_pipeline;
pub mod remote_call;
pub mod run_escalation;
pub mod task_group;
