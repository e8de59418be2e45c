//! Parameters of the reference pipelines

use deliberation_domain::{CompositeStrategy, RubricScale};
use serde::{Deserialize, Serialize};

/// Crowd scoring (idea cards, blind cross-scoring rounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    pub rounds: usize,
    pub composite: CompositeStrategy,
    pub scale: RubricScale,
    /// Rubric dimensions requested from scorers
    pub dimensions: Vec<String>,
    /// Seed for target selection; random when `None`
    pub seed: Option<u64>,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            rounds: 5,
            composite: CompositeStrategy::sum_overall(),
            scale: RubricScale::default(),
            dimensions: ["boldness", "feasibility", "impact", "overall"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            seed: None,
        }
    }
}

impl ScoringParams {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the composite strategy, adding any dimension it reads to the
    /// rubric so scorers are asked for it
    pub fn with_composite(mut self, composite: CompositeStrategy) -> Self {
        for dim in composite.dimensions() {
            if !self.dimensions.iter().any(|d| d == dim) {
                self.dimensions.push(dim.to_string());
            }
        }
        self.composite = composite;
        self
    }

    /// Replace the rubric; the composite's own dimensions are kept
    pub fn with_dimensions<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = dimensions.into_iter().map(Into::into).collect();
        let composite = std::mem::take(&mut self.composite);
        self.with_composite(composite)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn dimension_refs(&self) -> Vec<&str> {
        self.dimensions.iter().map(String::as_str).collect()
    }
}

/// Dot vote (rapid ideas, votes for others' ideas)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotVoteParams {
    pub ideas_per_participant: usize,
    pub votes_per_participant: usize,
    /// Re-rank the tally winners with a Borda count over full rankings
    #[serde(default)]
    pub runoff: bool,
}

impl Default for DotVoteParams {
    fn default() -> Self {
        Self {
            ideas_per_participant: 8,
            votes_per_participant: 3,
            runoff: false,
        }
    }
}

impl DotVoteParams {
    pub fn with_runoff(mut self, runoff: bool) -> Self {
        self.runoff = runoff;
        self
    }
}
