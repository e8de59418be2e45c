//! Scored items and rubric score cards.
//!
//! Scores accumulate on a [`ScoredItem`] while a scoring phase is open;
//! [`ScoredItem::finalize`] computes the derived aggregates once it closes.

pub mod score_card;
pub mod scored_item;

pub use score_card::{RubricScale, ScoreCard};
pub use scored_item::{CompositeStrategy, ItemAggregates, ScoreRejected, ScoredItem};
