//! Participant value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An identity that contributes to or scores a phase's output (Value Object)
///
/// The `id` is what self-exclusion checks compare against, so it must be
/// unique within a run. The optional `persona` is forwarded to the
/// reasoning engine as a system prompt.
///
/// # Example
///
/// ```
/// use deliberation_domain::Participant;
///
/// let cfo = Participant::with_persona("CFO", "You are a CFO focused on capital allocation.");
/// assert_eq!(cfo.id(), "CFO");
/// assert!(cfo.persona().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    persona: Option<String>,
}

impl Participant {
    /// Create a participant without a persona
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            persona: None,
        }
    }

    /// Create a participant with a persona
    pub fn with_persona(id: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            persona: Some(persona.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn persona(&self) -> Option<&str> {
        self.persona.as_deref()
    }

    /// The identity used for orchestrator-owned mechanical calls
    /// (synthesis, evaluation, oversight) that have no participant behind them.
    pub fn system() -> Self {
        Self::new("system")
    }

    /// Default strategic panel used when no participants are configured.
    pub fn default_panel() -> Vec<Participant> {
        vec![
            Participant::with_persona(
                "CEO",
                "You are a CEO focused on strategy, vision, and competitive positioning.",
            ),
            Participant::with_persona(
                "CFO",
                "You are a CFO focused on financial analysis, risk, and capital allocation.",
            ),
            Participant::with_persona(
                "CTO",
                "You are a CTO focused on technology strategy, architecture, and innovation.",
            ),
        ]
    }

    /// Check that a participant set is usable for a run: non-empty,
    /// no blank ids and no duplicate ids.
    pub fn validate_set(participants: &[Participant]) -> Result<(), DomainError> {
        if participants.is_empty() {
            return Err(DomainError::NoParticipants);
        }
        let mut seen = HashSet::new();
        for p in participants {
            if p.id.trim().is_empty() {
                return Err(DomainError::InvalidParticipant(
                    "participant id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(p.id.as_str()) {
                return Err(DomainError::DuplicateParticipant(p.id.clone()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_set_ok() {
        assert!(Participant::validate_set(&Participant::default_panel()).is_ok());
    }

    #[test]
    fn test_validate_set_empty() {
        assert_eq!(
            Participant::validate_set(&[]),
            Err(DomainError::NoParticipants)
        );
    }

    #[test]
    fn test_validate_set_duplicate() {
        let set = vec![Participant::new("a"), Participant::new("b"), Participant::new("a")];
        assert_eq!(
            Participant::validate_set(&set),
            Err(DomainError::DuplicateParticipant("a".to_string()))
        );
    }

    #[test]
    fn test_validate_set_blank_id() {
        let set = vec![Participant::new("  ")];
        assert!(matches!(
            Participant::validate_set(&set),
            Err(DomainError::InvalidParticipant(_))
        ));
    }

    #[test]
    fn test_persona_roundtrip() {
        let p = Participant::with_persona("CTO", "tech");
        let json = serde_json::to_string(&p).unwrap();
        let back: Participant = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);

        let bare: Participant = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(bare.persona(), None);
    }
}
