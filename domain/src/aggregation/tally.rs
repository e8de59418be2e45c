//! Weighted vote tally

use serde::{Deserialize, Serialize};

/// How many winners a tally guarantees, and how far ties may extend it
const BASE_WINNERS: usize = 3;
const MAX_WINNERS: usize = 5;

/// Vote counts per distinct item, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    counts: Vec<(String, usize)>,
}

impl VoteTally {
    /// Count votes; blank votes are ignored and items are trimmed.
    ///
    /// ```
    /// use deliberation_domain::aggregation::VoteTally;
    ///
    /// let tally = VoteTally::count(["a", "b", "a", " ", "c"]);
    /// assert_eq!(tally.count_of("a"), 2);
    /// assert_eq!(tally.total_votes(), 4);
    /// ```
    pub fn count<I, S>(votes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Self::default();
        for vote in votes {
            tally.add(vote.as_ref());
        }
        tally
    }

    pub fn add(&mut self, vote: &str) {
        let vote = vote.trim();
        if vote.is_empty() {
            return;
        }
        match self.counts.iter_mut().find(|(item, _)| item == vote) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((vote.to_string(), 1)),
        }
    }

    pub fn count_of(&self, item: &str) -> usize {
        self.counts
            .iter()
            .find(|(i, _)| i == item)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total_votes(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// All items by count, descending; ties keep first-appearance order
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The top three items, extended to the 4th and 5th only when they tie
    /// the 3rd-place count.
    pub fn winners(&self) -> Vec<String> {
        self.winners_with(BASE_WINNERS, MAX_WINNERS)
    }

    /// Tie-inclusive cutoff: always take the first `base` items, then keep
    /// taking items (up to `max`) while they match the `base`-th count.
    pub fn winners_with(&self, base: usize, max: usize) -> Vec<String> {
        let ranked = self.ranked();
        let mut winners = Vec::new();
        let mut cutoff = 0;
        for (i, (item, count)) in ranked.into_iter().enumerate() {
            if i < base {
                cutoff = count;
                winners.push(item);
            } else if i < max && count >= cutoff {
                winners.push(item);
            } else {
                break;
            }
        }
        winners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally() {
        let tally = VoteTally::count(Vec::<String>::new());
        assert!(tally.winners().is_empty());
        assert_eq!(tally.total_votes(), 0);
    }

    #[test]
    fn test_fewer_than_three_items() {
        let tally = VoteTally::count(["x", "y", "x"]);
        assert_eq!(tally.winners(), vec!["x", "y"]);
    }

    #[test]
    fn test_top_three_no_ties() {
        let tally = VoteTally::count(["a", "a", "a", "b", "b", "c", "c", "d"]);
        // c has 2 votes, d has 1: d does not tie third place
        assert_eq!(tally.winners(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_at_cutoff_extend_to_five() {
        let tally = VoteTally::count(["a", "a", "b", "c", "d", "e", "f"]);
        // a=2, then b..f all at 1: third place count is 1, 4th and 5th tie it
        assert_eq!(tally.winners(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_at_least_three_when_three_distinct() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["a", "b", "c"],
            vec!["a", "a", "a", "b", "c", "d", "d"],
            vec!["q", "r", "s", "t", "u", "v", "w"],
        ];
        for votes in cases {
            let tally = VoteTally::count(&votes);
            let winners = tally.winners();
            assert!(winners.len() >= 3);
            assert!(winners.len() <= 5);
            // Nothing left out ties the last winner's count unless the cap was hit
            let last = tally.count_of(winners.last().unwrap());
            if winners.len() < 5 {
                assert!(tally
                    .ranked()
                    .iter()
                    .filter(|(i, _)| !winners.contains(i))
                    .all(|(_, n)| *n < last));
            }
        }
    }

    #[test]
    fn test_trimmed_votes_merge() {
        let tally = VoteTally::count(["idea one", " idea one ", "idea two"]);
        assert_eq!(tally.count_of("idea one"), 2);
        assert_eq!(tally.distinct(), 2);
    }
}
