//! Borda count over ranked ballots

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One participant's ranking, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBallot {
    pub voter: String,
    /// `(rank, option)` with rank 1 as the best
    pub rankings: Vec<(usize, String)>,
}

impl RankedBallot {
    pub fn new(voter: impl Into<String>) -> Self {
        Self {
            voter: voter.into(),
            rankings: Vec::new(),
        }
    }

    pub fn rank(mut self, rank: usize, option: impl Into<String>) -> Self {
        self.rankings.push((rank, option.into()));
        self
    }

    /// Build from an ordered list, assigning ranks 1..=n
    pub fn ordered<I, S>(voter: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            voter: voter.into(),
            rankings: options
                .into_iter()
                .enumerate()
                .map(|(i, o)| (i + 1, o.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BordaResult {
    /// Every option with its points, highest first; ties keep option order
    pub scores: Vec<(String, usize)>,
    /// Options sharing the top score; more than one means a tie
    pub top_tied: Vec<String>,
}

impl BordaResult {
    pub fn winner(&self) -> Option<&str> {
        self.scores.first().map(|(o, _)| o.as_str())
    }

    pub fn has_tie(&self) -> bool {
        self.top_tied.len() > 1
    }

    /// Points between first and second place
    pub fn margin(&self) -> usize {
        match self.scores.as_slice() {
            [(_, a), (_, b), ..] => a - b,
            _ => 0,
        }
    }
}

/// Resolve a free-text option name against the known options.
///
/// A trimmed, case-insensitive exact match wins. Otherwise the candidate
/// resolves only when exactly one option contains it or is contained in
/// it; an ambiguous candidate resolves to nothing.
pub fn match_option<'a>(candidate: &str, options: &'a [String]) -> Option<&'a str> {
    let wanted = candidate.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    if let Some(exact) = options.iter().find(|o| o.trim().to_lowercase() == wanted) {
        return Some(exact.as_str());
    }

    let mut overlapping = options.iter().filter(|o| {
        let lower = o.trim().to_lowercase();
        !lower.is_empty() && (lower.contains(&wanted) || wanted.contains(&lower))
    });
    match (overlapping.next(), overlapping.next()) {
        (Some(only), None) => Some(only.as_str()),
        _ => None,
    }
}

/// Score ballots: rank `r` of `k` options earns `k - r` points, so first
/// place earns `k - 1` and last earns nothing. Unrecognised options are
/// dropped.
pub fn borda_count(options: &[String], ballots: &[RankedBallot]) -> BordaResult {
    let k = options.len();
    let mut points: HashMap<&str, usize> = options.iter().map(|o| (o.as_str(), 0)).collect();

    for ballot in ballots {
        for (rank, option) in &ballot.rankings {
            let Some(matched) = match_option(option, options) else {
                continue;
            };
            if let Some(total) = points.get_mut(matched) {
                *total += k.saturating_sub(*rank);
            }
        }
    }

    let mut scores: Vec<(String, usize)> = options
        .iter()
        .map(|o| (o.clone(), points.get(o.as_str()).copied().unwrap_or(0)))
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let top_tied = match scores.first() {
        Some((_, top)) => scores
            .iter()
            .filter(|(_, s)| s == top)
            .map(|(o, _)| o.clone())
            .collect(),
        None => Vec::new(),
    };

    BordaResult { scores, top_tied }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Expand".into(), "Hold".into(), "Divest".into()]
    }

    #[test]
    fn test_points_per_rank() {
        let ballots = vec![
            RankedBallot::ordered("CEO", ["Expand", "Hold", "Divest"]),
            RankedBallot::ordered("CFO", ["Hold", "Expand", "Divest"]),
            RankedBallot::ordered("CTO", ["Expand", "Divest", "Hold"]),
        ];
        let result = borda_count(&options(), &ballots);
        assert_eq!(
            result.scores,
            vec![
                ("Expand".to_string(), 5),
                ("Hold".to_string(), 3),
                ("Divest".to_string(), 1)
            ]
        );
        assert_eq!(result.winner(), Some("Expand"));
        assert_eq!(result.margin(), 2);
        assert!(!result.has_tie());
    }

    #[test]
    fn test_tie_detected() {
        let ballots = vec![
            RankedBallot::ordered("A", ["Expand", "Hold", "Divest"]),
            RankedBallot::ordered("B", ["Hold", "Expand", "Divest"]),
        ];
        let result = borda_count(&options(), &ballots);
        assert!(result.has_tie());
        assert_eq!(result.top_tied, vec!["Expand", "Hold"]);
    }

    #[test]
    fn test_fuzzy_matching() {
        let opts = options();
        assert_eq!(match_option("expand", &opts), Some("Expand"));
        assert_eq!(match_option("Option: Hold steady", &opts), Some("Hold"));
        assert_eq!(match_option("Acquire", &opts), None);
        assert_eq!(match_option("  ", &opts), None);

        let ballots = vec![RankedBallot::new("A").rank(1, "divest now").rank(9, "hold")];
        let result = borda_count(&opts, &ballots);
        assert_eq!(result.winner(), Some("Divest"));
        // rank beyond k earns nothing
        assert_eq!(result.scores[1].1, 0);
    }

    #[test]
    fn test_ambiguous_match_resolves_to_nothing() {
        let opts: Vec<String> = vec!["A one".into(), "B one".into(), "C two".into()];
        assert_eq!(match_option("one", &opts), None);
        assert_eq!(match_option("o", &opts), None);
        assert_eq!(match_option("two", &opts), Some("C two"));
        assert_eq!(match_option(" b ONE ", &opts), Some("B one"));
    }

    #[test]
    fn test_no_options() {
        let result = borda_count(&[], &[RankedBallot::ordered("A", ["x"])]);
        assert!(result.scores.is_empty());
        assert!(result.winner().is_none());
    }
}
