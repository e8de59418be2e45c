//! Application-level configuration.
//!
//! These types control how use cases issue calls; they are filled from the
//! loaded file configuration by the composition root.
//!
//! - [`ModelRoster`] - which model serves each [`ModelTier`](deliberation_domain::ModelTier)
//! - [`CallBudgets`] - token budgets per call class
//! - [`ScoringParams`] / [`DotVoteParams`] - reference pipeline parameters

pub mod call_budgets;
pub mod model_roster;
pub mod pipeline_params;

pub use call_budgets::CallBudgets;
pub use model_roster::ModelRoster;
pub use pipeline_params::{DotVoteParams, ScoringParams};
