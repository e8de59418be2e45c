//! Composite ranking

use crate::scoring::{CompositeStrategy, ScoredItem};

/// Finalize every item and sort by composite score, highest first.
///
/// The sort is stable: items with equal composites keep their insertion
/// order.
pub fn rank_items(items: &mut [ScoredItem], strategy: &CompositeStrategy) {
    for item in items.iter_mut() {
        item.finalize(strategy);
    }
    items.sort_by(|a, b| b.composite().total_cmp(&a.composite()));
}
