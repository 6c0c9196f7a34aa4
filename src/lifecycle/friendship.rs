use tracing::{debug, trace, warn};

use crate::affinity;
use crate::config::FriendshipParams;
use crate::graph::RelationshipGraph;
use crate::person::PersonId;
use crate::random::RandomSource;

use super::clamp_to_pool;

/// What one friendship pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FriendshipOutcome {
    /// Initiators actually sampled
    pub initiators: usize,
    /// Candidate pairs that reached a draw
    pub evaluated: usize,
    /// New friendships as (initiator, friend), in formation order
    pub formed: Vec<(PersonId, PersonId)>,
    /// Pairs skipped because an attribute vector was degenerate
    pub degenerate: usize,
}

/// Form new friendships across the whole population.
///
/// Orientation plays no part. An initiator keeps scanning after a success,
/// so one call can give the same person several new friends.
pub fn form_friendships<R: RandomSource + ?Sized>(
    graph: &mut RelationshipGraph,
    params: &FriendshipParams,
    rng: &mut R,
) -> FriendshipOutcome {
    let everyone = graph.ids();
    let sample_size = clamp_to_pool(params.sample_size, everyone.len(), "friendship sample");
    let pool_size = clamp_to_pool(params.candidate_pool, everyone.len(), "friendship candidates");

    let mut outcome = FriendshipOutcome::default();

    for initiator in rng.sample(&everyone, sample_size) {
        outcome.initiators += 1;

        for candidate in rng.sample(&everyone, pool_size) {
            let me = graph.person(initiator);
            if candidate == initiator
                || me.is_friend(candidate)
                || me.current_partner() == Some(candidate)
            {
                continue;
            }

            let mut probability = 1.0;
            if me.is_ex(candidate) {
                probability -= params.ex_penalty;
            }

            match affinity::angle(&me.attributes, &graph.person(candidate).attributes) {
                Ok(theta) => probability -= params.penalties.bonding_penalty(theta),
                Err(e) => {
                    warn!("Skipping friendship {} -> {}: {}", initiator, candidate, e);
                    outcome.degenerate += 1;
                    continue;
                }
            }

            let draw = rng.uniform();
            outcome.evaluated += 1;
            trace!("friendship {} -> {}: p={:.2} draw={:.3}", initiator, candidate, probability, draw);

            if draw <= probability {
                graph.add_friendship(initiator, candidate);
                outcome.formed.push((initiator, candidate));
            }
        }
    }

    debug!(
        "Friendship pass: {} initiators, {} pairs scored, {} new friendships",
        outcome.initiators,
        outcome.evaluated,
        outcome.formed.len()
    );
    outcome
}
