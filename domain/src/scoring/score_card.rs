//! Rubric score cards

use crate::core::participant::Participant;
use crate::util::number_like;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Inclusive numeric range of a rubric (1-5 unless a protocol says otherwise)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricScale {
    pub min: f64,
    pub max: f64,
}

impl RubricScale {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Midpoint, used as the neutral fallback score
    pub fn neutral(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Bounds as a prompt would state them, e.g. `1-5` or `0.5-2.5`
    pub fn label(&self) -> String {
        format!("{}-{}", self.min, self.max)
    }
}

impl Default for RubricScale {
    fn default() -> Self {
        Self::new(1.0, 5.0)
    }
}

/// One scorer's assessment of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub scorer: Participant,
    /// Dimension name -> value, e.g. `overall -> 4.0`
    pub dimensions: BTreeMap<String, f64>,
    #[serde(default)]
    pub reaction: String,
    /// True when the card was substituted because the scorer's output was unusable
    #[serde(default)]
    pub defaulted: bool,
}

impl ScoreCard {
    pub fn new(scorer: Participant, dimensions: BTreeMap<String, f64>) -> Self {
        Self {
            scorer,
            dimensions,
            reaction: String::new(),
            defaulted: false,
        }
    }

    /// Neutral card for a scorer whose response could not be parsed
    pub fn neutral(scorer: Participant, dimensions: &[&str], scale: RubricScale) -> Self {
        let dims = dimensions
            .iter()
            .map(|d| (d.to_string(), scale.neutral()))
            .collect();
        Self {
            scorer,
            dimensions: dims,
            reaction: "(scoring parse error)".to_string(),
            defaulted: true,
        }
    }

    /// Build a card from a parsed JSON object.
    ///
    /// Each requested dimension is read as a number and clamped into `scale`;
    /// a missing, non-numeric or non-finite dimension gets the neutral value. The
    /// reaction comes from `one_line_reaction` or `reaction`.
    pub fn from_json(
        scorer: Participant,
        value: &Value,
        dimensions: &[&str],
        scale: RubricScale,
    ) -> Self {
        let dims = dimensions
            .iter()
            .map(|d| {
                let v = value
                    .get(*d)
                    .and_then(number_like)
                    .filter(|v| v.is_finite())
                    .map(|v| scale.clamp(v))
                    .unwrap_or_else(|| scale.neutral());
                (d.to_string(), v)
            })
            .collect();
        let reaction = value
            .get("one_line_reaction")
            .or_else(|| value.get("reaction"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Self {
            scorer,
            dimensions: dims,
            reaction,
            defaulted: false,
        }
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.dimensions.get(dimension).copied()
    }

    pub fn with_reaction(mut self, reaction: impl Into<String>) -> Self {
        self.reaction = reaction.into();
        self
    }
}
