//! Token budgets per call class

use serde::{Deserialize, Serialize};

/// Output-token budgets used when use cases build requests
///
/// `reasoning_tokens` is only attached to deep-tier calls that ask for
/// extended thinking; it counts against the same output limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBudgets {
    /// Long-form answers (deep tier, or cheap tier producing prose)
    pub deep_tokens: u32,
    /// Short structured evaluations (cheap tier)
    pub cheap_tokens: u32,
    pub reasoning_tokens: u32,
}

impl Default for CallBudgets {
    fn default() -> Self {
        Self {
            deep_tokens: 4096,
            cheap_tokens: 1024,
            reasoning_tokens: 10_000,
        }
    }
}

impl CallBudgets {
    pub fn with_deep_tokens(mut self, tokens: u32) -> Self {
        self.deep_tokens = tokens;
        self
    }

    pub fn with_cheap_tokens(mut self, tokens: u32) -> Self {
        self.cheap_tokens = tokens;
        self
    }

    pub fn with_reasoning_tokens(mut self, tokens: u32) -> Self {
        self.reasoning_tokens = tokens;
        self
    }
}
