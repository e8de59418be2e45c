//! Participant panel from TOML (`[[participants]]` tables)

use deliberation_domain::Participant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileParticipant {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl From<&FileParticipant> for Participant {
    fn from(p: &FileParticipant) -> Self {
        match &p.persona {
            Some(persona) => Participant::with_persona(p.id.trim(), persona.as_str()),
            None => Participant::new(p.id.trim()),
        }
    }
}

/// The built-in panel in file form
pub fn default_participants() -> Vec<FileParticipant> {
    Participant::default_panel()
        .iter()
        .map(|p| FileParticipant {
            id: p.id().to_string(),
            persona: p.persona().map(str::to_string),
        })
        .collect()
}
