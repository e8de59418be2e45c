//! Spread of numeric estimates across participants.
//!
//! Used by estimate-and-revise rounds: a tight inter-quartile range relative
//! to the median means the panel has converged.

use serde::{Deserialize, Serialize};

/// IQR spread below this fraction of the median counts as converged
pub const DEFAULT_CONVERGENCE_RATIO: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionStats {
    pub count: usize,
    pub median: f64,
    pub iqr_low: f64,
    pub iqr_high: f64,
    pub spread: f64,
}

impl DispersionStats {
    /// Median and inter-quartile bounds of `values`; `None` when empty.
    ///
    /// With fewer than four values the bounds are the min and max.
    /// Non-finite values are ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let (iqr_low, iqr_high) = if n < 4 {
            (sorted[0], sorted[n - 1])
        } else {
            (sorted[n / 4], sorted[(3 * n) / 4])
        };

        Some(Self {
            count: n,
            median,
            iqr_low,
            iqr_high,
            spread: iqr_high - iqr_low,
        })
    }

    /// Converged when the spread is under `ratio` of the median's magnitude.
    /// A zero median only converges on zero spread.
    pub fn converged(&self, ratio: f64) -> bool {
        if self.median == 0.0 {
            return self.spread == 0.0;
        }
        self.spread < ratio * self.median.abs()
    }

    /// Agreement in `0.0..=1.0`: 1 when every estimate sits on the median,
    /// falling linearly as the spread approaches the median's magnitude.
    pub fn consensus_score(&self) -> f64 {
        if self.spread == 0.0 {
            return 1.0;
        }
        let scale = self.median.abs().max(f64::EPSILON);
        (1.0 - self.spread / scale).clamp(0.0, 1.0)
    }
}
