//! Escalation thresholds from TOML (`[escalation]` section)

use deliberation_domain::{DomainError, EscalationThresholds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEscalationConfig {
    /// T1 confidence (0-100) needed to stop
    pub confidence_threshold: u32,
    /// T2 consensus (0.0-1.0) needed to stop
    pub consensus_threshold: f64,
}

impl Default for FileEscalationConfig {
    fn default() -> Self {
        let defaults = EscalationThresholds::default();
        Self {
            confidence_threshold: defaults.confidence() as u32,
            consensus_threshold: defaults.consensus(),
        }
    }
}

impl FileEscalationConfig {
    pub fn thresholds(&self) -> Result<EscalationThresholds, DomainError> {
        let confidence = u8::try_from(self.confidence_threshold).map_err(|_| {
            DomainError::InvalidThreshold(format!(
                "confidence threshold {} is above 100",
                self.confidence_threshold
            ))
        })?;
        EscalationThresholds::new(confidence, self.consensus_threshold)
    }
}
