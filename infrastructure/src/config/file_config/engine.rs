//! Reasoning engine configuration from TOML (`[engine]` section)

use deliberation_application::ModelRoster;
use serde::{Deserialize, Serialize};

/// Anthropic Messages API connection and model selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Environment variable holding the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Anthropic API version header.
    pub api_version: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Model for creative and strategic calls
    pub deep_model: String,
    /// Model for scoring, evaluation and synthesis
    pub cheap_model: String,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let roster = ModelRoster::default();
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_version: "2023-06-01".to_string(),
            timeout_seconds: 300,
            deep_model: roster.deep,
            cheap_model: roster.cheap,
        }
    }
}

impl FileEngineConfig {
    pub fn model_roster(&self) -> ModelRoster {
        ModelRoster::new(self.cheap_model.as_str(), self.deep_model.as_str())
    }
}
