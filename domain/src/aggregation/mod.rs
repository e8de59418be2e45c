//! Aggregation engine.
//!
//! Pure reductions over scored or voted results:
//!
//! | Module | Algorithm |
//! |--------|-----------|
//! | [`ranking`] | Composite ranking (stable, descending) |
//! | [`quartile`] | Top `max(1, n / 4)` selection |
//! | [`round_robin`] | Self-excluding scoring assignment |
//! | [`tally`] | Vote counting with a tie-inclusive cutoff |
//! | [`dispersion`] | Median / IQR spread and consensus score |
//! | [`borda`] | Borda count over ranked ballots |

pub mod borda;
pub mod dispersion;
pub mod quartile;
pub mod ranking;
pub mod round_robin;
pub mod tally;

pub use borda::{BordaResult, RankedBallot, borda_count, match_option};
pub use dispersion::{DEFAULT_CONVERGENCE_RATIO, DispersionStats};
pub use quartile::{mark_top_quartile, quartile_count};
pub use ranking::rank_items;
pub use round_robin::{Assignment, RoundRobinAssigner, Target};
pub use tally::VoteTally;
