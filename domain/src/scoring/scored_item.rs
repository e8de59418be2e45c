//! Scored items and composite scoring

use super::score_card::ScoreCard;
use crate::core::participant::Participant;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// How a single ranking value is derived from an item's score cards
///
/// Protocols disagree here: crowd-sourcing style runs total one "overall"
/// dimension across scorers, risk-style runs multiply two dimension means
/// (severity × likelihood). Both are available; the caller picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy", content = "dimensions")]
pub enum CompositeStrategy {
    /// Sum of one dimension over every card
    SumOf(String),
    /// Product of the per-dimension means of two dimensions
    Product(String, String),
}

impl CompositeStrategy {
    /// The 25/10 default: sum of `overall`
    pub fn sum_overall() -> Self {
        CompositeStrategy::SumOf("overall".to_string())
    }

    pub fn severity_times_likelihood() -> Self {
        CompositeStrategy::Product("severity".to_string(), "likelihood".to_string())
    }

    /// Dimensions the composite is computed from; scorers must be asked
    /// for every one of them
    pub fn dimensions(&self) -> Vec<&str> {
        match self {
            CompositeStrategy::SumOf(dim) => vec![dim.as_str()],
            CompositeStrategy::Product(a, b) => vec![a.as_str(), b.as_str()],
        }
    }
}

impl Default for CompositeStrategy {
    fn default() -> Self {
        Self::sum_overall()
    }
}

/// Aggregates computed once scoring closes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemAggregates {
    /// Mean of each dimension across all cards
    pub means: BTreeMap<String, f64>,
    /// Sum of the primary dimension across all cards
    pub total: f64,
    /// Ranking value per the chosen [`CompositeStrategy`]
    pub composite: f64,
    pub score_count: usize,
    pub top_quartile: bool,
}

/// Why a score card was refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreRejected {
    #[error("{0} cannot score their own item")]
    SelfAssessment(String),

    #[error("{0} already scored this item")]
    Duplicate(String),
}

/// An item under assessment
///
/// Invariant: the author never appears among the scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub id: String,
    pub author: Participant,
    pub content: Value,
    scores: Vec<ScoreCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aggregates: Option<ItemAggregates>,
}

impl ScoredItem {
    pub fn new(id: impl Into<String>, author: Participant, content: Value) -> Self {
        Self {
            id: id.into(),
            author,
            content,
            scores: Vec::new(),
            aggregates: None,
        }
    }

    /// Record a score card, refusing self-assessment and repeat scoring
    pub fn add_score(&mut self, card: ScoreCard) -> Result<(), ScoreRejected> {
        if card.scorer.id() == self.author.id() {
            return Err(ScoreRejected::SelfAssessment(card.scorer.id().to_string()));
        }
        if self.scores.iter().any(|c| c.scorer.id() == card.scorer.id()) {
            return Err(ScoreRejected::Duplicate(card.scorer.id().to_string()));
        }
        self.scores.push(card);
        Ok(())
    }

    pub fn scores(&self) -> &[ScoreCard] {
        &self.scores
    }

    pub fn aggregates(&self) -> Option<&ItemAggregates> {
        self.aggregates.as_ref()
    }

    /// Composite value, 0 before [`finalize`](Self::finalize)
    pub fn composite(&self) -> f64 {
        self.aggregates.as_ref().map(|a| a.composite).unwrap_or(0.0)
    }

    pub fn is_top_quartile(&self) -> bool {
        self.aggregates.as_ref().is_some_and(|a| a.top_quartile)
    }

    pub(crate) fn set_top_quartile(&mut self, selected: bool) {
        self.aggregates.get_or_insert_with(ItemAggregates::default).top_quartile = selected;
    }

    /// Compute means, total and composite from the collected cards.
    ///
    /// An item nobody scored finalizes to all-zero aggregates.
    pub fn finalize(&mut self, strategy: &CompositeStrategy) {
        let n = self.scores.len();
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for card in &self.scores {
            for (dim, v) in &card.dimensions {
                *sums.entry(dim.clone()).or_default() += v;
            }
        }
        let means: BTreeMap<String, f64> = if n == 0 {
            BTreeMap::new()
        } else {
            sums.iter().map(|(d, s)| (d.clone(), s / n as f64)).collect()
        };

        let (total, composite) = match strategy {
            CompositeStrategy::SumOf(dim) => {
                let total = sums.get(dim).copied().unwrap_or(0.0);
                (total, total)
            }
            CompositeStrategy::Product(a, b) => {
                let total = sums.get(a).copied().unwrap_or(0.0);
                let product = means.get(a).copied().unwrap_or(0.0)
                    * means.get(b).copied().unwrap_or(0.0);
                (total, product)
            }
        };

        let top_quartile = self.is_top_quartile();
        self.aggregates = Some(ItemAggregates {
            means,
            total,
            composite,
            score_count: n,
            top_quartile,
        });
    }
}
