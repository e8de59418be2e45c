//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section defaults, so a partial file (or none) is valid.

mod budgets;
mod engine;
mod escalation;
mod output;
mod participants;
mod paths;
mod scoring;

pub use budgets::FileBudgetsConfig;
pub use engine::FileEngineConfig;
pub use escalation::FileEscalationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use participants::{FileParticipant, default_participants};
pub use paths::{FileCatalogConfig, FileTraceConfig};
pub use scoring::{FileComposite, FileDotVoteConfig, FileScoringConfig};

use deliberation_domain::Participant;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from validating a loaded configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("engine.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("engine.{0} cannot be empty")]
    EmptyModelName(&'static str),

    #[error("budgets.{0} cannot be 0")]
    ZeroBudget(&'static str),

    #[error("escalation.confidence_threshold must be 0-100, got {0}")]
    ConfidenceOutOfRange(u32),

    #[error("escalation.consensus_threshold must be 0.0-1.0, got {0}")]
    ConsensusOutOfRange(f64),

    #[error("scoring.rounds must be at least 1")]
    ZeroRounds,

    #[error("scoring scale is empty: min {min} is not below max {max}")]
    InvalidScale { min: f64, max: f64 },

    #[error("participants cannot be empty")]
    NoParticipants,

    #[error("participant id cannot be empty")]
    EmptyParticipantId,

    #[error("duplicate participant id: {0}")]
    DuplicateParticipant(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Reasoning engine connection and models
    pub engine: FileEngineConfig,
    /// Token budgets per call class
    pub budgets: FileBudgetsConfig,
    /// Escalation thresholds
    pub escalation: FileEscalationConfig,
    /// Crowd scoring settings
    pub scoring: FileScoringConfig,
    /// Dot vote settings
    pub dot_vote: FileDotVoteConfig,
    /// The panel
    pub participants: Vec<FileParticipant>,
    /// JSONL call trace
    pub trace: FileTraceConfig,
    /// Capability catalog location
    pub catalog: FileCatalogConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            engine: FileEngineConfig::default(),
            budgets: FileBudgetsConfig::default(),
            escalation: FileEscalationConfig::default(),
            scoring: FileScoringConfig::default(),
            dot_vote: FileDotVoteConfig::default(),
            participants: default_participants(),
            trace: FileTraceConfig::default(),
            catalog: FileCatalogConfig::default(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    /// Check values serde cannot: ranges, emptiness and uniqueness.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.engine.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        for (field, model) in [
            ("deep_model", &self.engine.deep_model),
            ("cheap_model", &self.engine.cheap_model),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName(field));
            }
        }

        for (field, tokens) in [
            ("deep_tokens", self.budgets.deep_tokens),
            ("cheap_tokens", self.budgets.cheap_tokens),
            ("reasoning_tokens", self.budgets.reasoning_tokens),
        ] {
            if tokens == 0 {
                return Err(ConfigValidationError::ZeroBudget(field));
            }
        }

        if self.escalation.confidence_threshold > 100 {
            return Err(ConfigValidationError::ConfidenceOutOfRange(
                self.escalation.confidence_threshold,
            ));
        }
        if !(0.0..=1.0).contains(&self.escalation.consensus_threshold) {
            return Err(ConfigValidationError::ConsensusOutOfRange(
                self.escalation.consensus_threshold,
            ));
        }

        if self.scoring.rounds == 0 {
            return Err(ConfigValidationError::ZeroRounds);
        }
        if self.scoring.scale_min.partial_cmp(&self.scoring.scale_max)
            != Some(std::cmp::Ordering::Less)
        {
            return Err(ConfigValidationError::InvalidScale {
                min: self.scoring.scale_min,
                max: self.scoring.scale_max,
            });
        }

        if self.participants.is_empty() {
            return Err(ConfigValidationError::NoParticipants);
        }
        let mut seen = HashSet::new();
        for p in &self.participants {
            let id = p.id.trim();
            if id.is_empty() {
                return Err(ConfigValidationError::EmptyParticipantId);
            }
            if !seen.insert(id) {
                return Err(ConfigValidationError::DuplicateParticipant(id.to_string()));
            }
        }

        Ok(())
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.participants.iter().map(Participant::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[engine]
base_url = "http://localhost:8080"
timeout_seconds = 120

[budgets]
deep_tokens = 8000

[escalation]
confidence_threshold = 90
consensus_threshold = 0.6

[[participants]]
id = "Optimist"
persona = "You see the upside."

[[participants]]
id = "Skeptic"

[trace]
enabled = true
dir = "/var/tmp/traces"

[catalog]
dir = "./protocols"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.base_url, "http://localhost:8080");
        assert_eq!(config.engine.timeout_seconds, 120);
        assert_eq!(config.budgets.deep_tokens, 8000);
        assert_eq!(config.budgets.cheap_tokens, 1024);
        assert_eq!(config.escalation.thresholds().unwrap().confidence(), 90);
        assert!(config.trace.enabled);

        let participants = config.participants();
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].persona(), Some("You see the upside."));
        assert_eq!(participants[1].persona(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.participants.len(), 3);
        assert_eq!(config.participants[0].id, "CEO");
        assert!(!config.trace.enabled);
        assert!(config.catalog.dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FileConfig::default();
        config.engine.timeout_seconds = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));

        let mut config = FileConfig::default();
        config.escalation.confidence_threshold = 101;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ConfidenceOutOfRange(101))
        );

        let mut config = FileConfig::default();
        config.escalation.consensus_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ConsensusOutOfRange(_))
        ));

        let mut config = FileConfig::default();
        config.budgets.cheap_tokens = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroBudget("cheap_tokens"))
        );

        let mut config = FileConfig::default();
        config.engine.deep_model = " ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName("deep_model"))
        );
    }

    #[test]
    fn test_validate_participants() {
        let mut config = FileConfig::default();
        config.participants.push(FileParticipant {
            id: "CFO ".to_string(),
            persona: None,
        });
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DuplicateParticipant("CFO".to_string()))
        );

        config.participants = vec![FileParticipant {
            id: "".to_string(),
            persona: None,
        }];
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyParticipantId)
        );

        config.participants.clear();
        assert_eq!(config.validate(), Err(ConfigValidationError::NoParticipants));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = FileConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: FileConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
