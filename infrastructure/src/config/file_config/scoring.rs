//! Reference pipeline parameters from TOML (`[scoring]` and `[dot_vote]`)

use deliberation_application::{DotVoteParams, ScoringParams};
use deliberation_domain::{CompositeStrategy, RubricScale};
use serde::{Deserialize, Serialize};

/// How scores collapse into one ranking value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileComposite {
    /// Total of the `overall` dimension across scorers
    #[default]
    SumOverall,
    /// Product of the means of `product_dimensions`
    Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScoringConfig {
    pub rounds: usize,
    pub composite: FileComposite,
    pub product_dimensions: [String; 2],
    /// Rubric bounds; the neutral fallback score is the midpoint
    pub scale_min: f64,
    pub scale_max: f64,
    /// Fixed seed for scoring target selection
    pub seed: Option<u64>,
}

impl Default for FileScoringConfig {
    fn default() -> Self {
        let scale = RubricScale::default();
        Self {
            rounds: ScoringParams::default().rounds,
            composite: FileComposite::default(),
            product_dimensions: ["impact".to_string(), "feasibility".to_string()],
            scale_min: scale.min,
            scale_max: scale.max,
            seed: None,
        }
    }
}

impl FileScoringConfig {
    pub fn to_params(&self) -> ScoringParams {
        let composite = match self.composite {
            FileComposite::SumOverall => CompositeStrategy::sum_overall(),
            FileComposite::Product => {
                let [a, b] = &self.product_dimensions;
                CompositeStrategy::Product(a.clone(), b.clone())
            }
        };
        let mut params = ScoringParams {
            scale: RubricScale::new(self.scale_min, self.scale_max),
            ..ScoringParams::default()
        }
        .with_rounds(self.rounds)
        .with_composite(composite);
        params.seed = self.seed;
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDotVoteConfig {
    pub ideas_per_participant: usize,
    pub votes_per_participant: usize,
    pub runoff: bool,
}

impl Default for FileDotVoteConfig {
    fn default() -> Self {
        let params = DotVoteParams::default();
        Self {
            ideas_per_participant: params.ideas_per_participant,
            votes_per_participant: params.votes_per_participant,
            runoff: params.runoff,
        }
    }
}

impl FileDotVoteConfig {
    pub fn to_params(&self) -> DotVoteParams {
        DotVoteParams {
            ideas_per_participant: self.ideas_per_participant,
            votes_per_participant: self.votes_per_participant,
            runoff: self.runoff,
        }
    }
}
