//! Pipeline run entities

use super::output::PhaseOutput;
use crate::core::topic::Topic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A completed phase (Entity)
///
/// Built once when the phase's fan-in and reduction are done; never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub name: String,
    pub started_at: DateTime<Utc>,
    #[serde(with = "crate::util::duration_secs")]
    pub duration: Duration,
    /// Outputs in participant order
    pub outputs: Vec<PhaseOutput>,
    /// The reduced value handed to later phases
    pub merged: Value,
    /// True when the reducer failed and a default was substituted
    pub defaulted: bool,
}

impl PhaseRecord {
    /// Participants whose call or extraction failed
    pub fn failed_participants(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|o| o.extraction.is_failure())
            .map(|o| o.participant.id())
            .collect()
    }
}

/// Top-level record of one pipeline invocation (Entity)
///
/// Phases are appended in execution order, exactly once each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    run_id: String,
    topic: Topic,
    started_at: DateTime<Utc>,
    phases: Vec<PhaseRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
    #[serde(with = "crate::util::duration_secs")]
    elapsed: Duration,
}

impl PipelineRun {
    pub fn new(run_id: impl Into<String>, topic: Topic) -> Self {
        Self {
            run_id: run_id.into(),
            topic,
            started_at: Utc::now(),
            phases: Vec::new(),
            output: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn phases(&self) -> &[PhaseRecord] {
        &self.phases
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseRecord> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Final output: the last phase's merged value unless overridden
    pub fn output(&self) -> Option<&Value> {
        self.output
            .as_ref()
            .or_else(|| self.phases.last().map(|p| &p.merged))
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Append a completed phase. A repeated phase name is refused.
    pub fn push_phase(&mut self, record: PhaseRecord) -> bool {
        if self.phase(&record.name).is_some() {
            return false;
        }
        self.phases.push(record);
        true
    }

    pub fn set_output(&mut self, output: Value) {
        self.output = Some(output);
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Names of phases that fell back to their default
    pub fn defaulted_phases(&self) -> Vec<&str> {
        self.phases
            .iter()
            .filter(|p| p.defaulted)
            .map(|p| p.name.as_str())
            .collect()
    }
}
