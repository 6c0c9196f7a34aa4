//! Relationship lifecycle transitions.
//!
//! Each procedure samples people, scores candidate pairs, draws once per
//! scored pair and commits accepted pairs to the graph immediately. Nothing
//! here looks for an optimal matching; the first accepted draw wins.

pub mod breakup;
pub mod friendship;
pub mod romance;

pub use breakup::{compute_breakups, BreakupOutcome};
pub use friendship::{form_friendships, FriendshipOutcome};
pub use romance::{form_romances, RomanceOutcome};

use tracing::debug;

/// Shrink a requested sample to what the pool can provide
pub(crate) fn clamp_to_pool(requested: usize, available: usize, what: &str) -> usize {
    if requested > available {
        debug!("{} of {} clamped to pool of {}", what, requested, available);
        available
    } else {
        requested
    }
}
