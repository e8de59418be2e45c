//! Token budget configuration from TOML (`[budgets]` section)

use deliberation_application::CallBudgets;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBudgetsConfig {
    pub deep_tokens: u32,
    pub cheap_tokens: u32,
    /// Extended thinking budget for deep-tier generation
    pub reasoning_tokens: u32,
}

impl Default for FileBudgetsConfig {
    fn default() -> Self {
        let budgets = CallBudgets::default();
        Self {
            deep_tokens: budgets.deep_tokens,
            cheap_tokens: budgets.cheap_tokens,
            reasoning_tokens: budgets.reasoning_tokens,
        }
    }
}

impl FileBudgetsConfig {
    pub fn to_call_budgets(&self) -> CallBudgets {
        CallBudgets::default()
            .with_deep_tokens(self.deep_tokens)
            .with_cheap_tokens(self.cheap_tokens)
            .with_reasoning_tokens(self.reasoning_tokens)
    }
}
