//! Escalation entities

use crate::core::error::DomainError;
use crate::core::topic::Topic;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Escalation tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    /// Single fast answer
    Single,
    /// Multi-participant consensus
    Consensus,
    /// Rebuttal round and oversight
    Oversight,
}

impl Tier {
    pub fn number(&self) -> u8 {
        match self {
            Tier::Single => 1,
            Tier::Consensus => 2,
            Tier::Oversight => 3,
        }
    }

    /// The tier to escalate to, `None` past T3
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Single => Some(Tier::Consensus),
            Tier::Consensus => Some(Tier::Oversight),
            Tier::Oversight => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Single => "Single Response",
            Tier::Consensus => "Multi-Participant Consensus",
            Tier::Oversight => "Rebuttal & Oversight",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.number())
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Tier::Single),
            2 => Ok(Tier::Consensus),
            3 => Ok(Tier::Oversight),
            other => Err(format!("tier must be 1..=3, got {other}")),
        }
    }
}

/// Acceptance thresholds (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationThresholds {
    /// T1 accepts at or above this confidence (0-100)
    confidence: u8,
    /// T2 accepts at or above this consensus score (0.0-1.0)
    consensus: f64,
}

impl EscalationThresholds {
    pub fn new(confidence: u8, consensus: f64) -> Result<Self, DomainError> {
        if confidence > 100 {
            return Err(DomainError::InvalidThreshold(format!(
                "confidence threshold must be 0-100, got {confidence}"
            )));
        }
        if !(0.0..=1.0).contains(&consensus) {
            return Err(DomainError::InvalidThreshold(format!(
                "consensus threshold must be 0.0-1.0, got {consensus}"
            )));
        }
        Ok(Self {
            confidence,
            consensus,
        })
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn consensus(&self) -> f64 {
        self.consensus
    }

    pub fn accepts_confidence(&self, confidence: u8) -> bool {
        confidence >= self.confidence
    }

    pub fn accepts_consensus(&self, consensus: f64) -> bool {
        consensus >= self.consensus
    }
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            confidence: 80,
            consensus: 0.7,
        }
    }
}

/// Outcome of one attempted tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierResult {
    pub tier: Tier,
    pub response: String,
    /// 0-100; for T2 this is the consensus score scaled by 100
    pub confidence: u8,
    pub reasoning: String,
    #[serde(with = "crate::util::duration_secs")]
    pub duration: Duration,
}

/// A complete escalation (Entity)
///
/// Tier results are stored in increasing tier order; once a tier is
/// accepted nothing higher is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRun {
    run_id: String,
    topic: Topic,
    tiers: Vec<TierResult>,
    final_response: String,
    flagged_for_human: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flag_reason: Option<String>,
    closed: bool,
}

impl EscalationRun {
    pub fn new(run_id: impl Into<String>, topic: Topic) -> Self {
        Self {
            run_id: run_id.into(),
            topic,
            tiers: Vec::new(),
            final_response: String::new(),
            flagged_for_human: false,
            flag_reason: None,
            closed: false,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn tiers(&self) -> &[TierResult] {
        &self.tiers
    }

    /// The highest tier attempted
    pub fn final_tier(&self) -> Option<Tier> {
        self.tiers.last().map(|t| t.tier)
    }

    pub fn final_response(&self) -> &str {
        &self.final_response
    }

    pub fn flagged_for_human(&self) -> bool {
        self.flagged_for_human
    }

    pub fn flag_reason(&self) -> Option<&str> {
        self.flag_reason.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The tier the next result must be for, `None` once closed
    pub fn expected_tier(&self) -> Option<Tier> {
        if self.closed {
            return None;
        }
        match self.final_tier() {
            None => Some(Tier::Single),
            Some(t) => t.next(),
        }
    }

    /// Record a tier result. Results must arrive in tier order; anything
    /// else (or anything after [`accept`](Self::accept)) is refused.
    pub fn record(&mut self, result: TierResult) -> Result<(), DomainError> {
        match self.expected_tier() {
            Some(expected) if expected == result.tier => {
                self.tiers.push(result);
                Ok(())
            }
            expected => Err(DomainError::InvalidTier(format!(
                "cannot record {} (expected {})",
                result.tier,
                expected.map_or_else(|| "none".to_string(), |t| t.to_string())
            ))),
        }
    }

    /// Close the run with the last recorded tier's response
    pub fn accept(&mut self) {
        if let Some(last) = self.tiers.last() {
            self.final_response = last.response.clone();
        }
        self.closed = true;
    }

    /// Close the run flagged for human review
    pub fn flag(&mut self, reason: Option<String>) {
        self.accept();
        self.flagged_for_human = true;
        self.flag_reason = reason;
    }

    pub fn total_duration(&self) -> Duration {
        self.tiers.iter().map(|t| t.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(tier: Tier, confidence: u8) -> TierResult {
        TierResult {
            tier,
            response: format!("{tier} answer"),
            confidence,
            reasoning: String::new(),
            duration: Duration::from_millis(100),
        }
    }

    fn run() -> EscalationRun {
        EscalationRun::new("r", Topic::new("Should we expand into APAC?").unwrap())
    }

    #[test]
    fn test_tier_order() {
        assert!(Tier::Single < Tier::Consensus);
        assert_eq!(Tier::Single.next(), Some(Tier::Consensus));
        assert_eq!(Tier::Oversight.next(), None);
        assert_eq!(Tier::try_from(2u8), Ok(Tier::Consensus));
        assert!(Tier::try_from(4u8).is_err());
        assert_eq!(Tier::Oversight.to_string(), "T3");
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(EscalationThresholds::new(101, 0.7).is_err());
        assert!(EscalationThresholds::new(80, 1.5).is_err());
        let t = EscalationThresholds::default();
        assert!(t.accepts_confidence(80));
        assert!(!t.accepts_confidence(79));
        assert!(t.accepts_consensus(0.75));
        assert!(!t.accepts_consensus(0.69));
    }

    #[test]
    fn test_record_enforces_monotonic_order() {
        let mut r = run();
        assert!(r.record(result(Tier::Consensus, 50)).is_err());
        r.record(result(Tier::Single, 60)).unwrap();
        assert!(r.record(result(Tier::Single, 90)).is_err());
        r.record(result(Tier::Consensus, 75)).unwrap();
        r.accept();
        assert!(r.record(result(Tier::Oversight, 10)).is_err());

        assert_eq!(r.final_tier(), Some(Tier::Consensus));
        assert_eq!(r.final_response(), "T2 answer");
        assert!(!r.flagged_for_human());
        assert_eq!(r.total_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_flagged_run() {
        let mut r = run();
        r.record(result(Tier::Single, 10)).unwrap();
        r.record(result(Tier::Consensus, 10)).unwrap();
        r.record(result(Tier::Oversight, 40)).unwrap();
        assert_eq!(r.expected_tier(), None);
        r.flag(Some("contradictions".into()));
        assert!(r.flagged_for_human());
        assert_eq!(r.flag_reason(), Some("contradictions"));
        assert_eq!(r.final_response(), "T3 answer");

        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["tiers"][2]["tier"], 3);
    }
}
