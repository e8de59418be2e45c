//! Tiered escalation domain.
//!
//! Three tiers of increasing cost, visited in order and never revisited:
//!
//! | Tier | Work | Accept when |
//! |------|------|-------------|
//! | T1 | one deep answer + cheap confidence check | `confidence >= confidence_threshold` |
//! | T2 | deep answer per participant + cheap synthesis | `consensus >= consensus_threshold` |
//! | T3 | deep rebuttal per participant + cheap oversight | always terminal |

pub mod entities;
pub mod verdicts;

pub use entities::{EscalationRun, EscalationThresholds, Tier, TierResult};
pub use verdicts::{ConfidenceVerdict, OversightVerdict, SynthesisVerdict};
