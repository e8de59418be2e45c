//! Quartile selection

use crate::scoring::ScoredItem;

/// Number of items in the top quartile of `n`: `max(1, n / 4)`, or 0 for
/// an empty sequence.
pub fn quartile_count(n: usize) -> usize {
    if n == 0 { 0 } else { (n / 4).max(1) }
}

/// Flag the first [`quartile_count`] items of an already ranked slice as
/// top quartile and clear the flag on the rest. Returns how many were
/// selected.
pub fn mark_top_quartile(ranked: &mut [ScoredItem]) -> usize {
    let selected = quartile_count(ranked.len());
    for (i, item) in ranked.iter_mut().enumerate() {
        item.set_top_quartile(i < selected);
    }
    selected
}
