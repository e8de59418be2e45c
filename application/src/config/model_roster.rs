//! Tier to model mapping

use deliberation_domain::ModelTier;
use serde::{Deserialize, Serialize};

/// Model ids for the two tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoster {
    pub cheap: String,
    pub deep: String,
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self {
            cheap: "claude-haiku-4-5-20251001".to_string(),
            deep: "claude-opus-4-6".to_string(),
        }
    }
}

impl ModelRoster {
    pub fn new(cheap: impl Into<String>, deep: impl Into<String>) -> Self {
        Self {
            cheap: cheap.into(),
            deep: deep.into(),
        }
    }

    pub fn for_tier(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Cheap => &self.cheap,
            ModelTier::Deep => &self.deep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tier() {
        let roster = ModelRoster::new("fast-1", "smart-1");
        assert_eq!(roster.for_tier(ModelTier::Cheap), "fast-1");
        assert_eq!(roster.for_tier(ModelTier::Deep), "smart-1");
    }
}
