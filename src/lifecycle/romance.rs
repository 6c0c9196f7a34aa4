use tracing::{debug, trace, warn};

use crate::affinity;
use crate::compatibility;
use crate::config::RomanceParams;
use crate::graph::RelationshipGraph;
use crate::person::PersonId;
use crate::random::RandomSource;

use super::clamp_to_pool;

/// What one romantic formation pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RomanceOutcome {
    /// Singles drawn as initiators
    pub initiators: usize,
    /// Initiators skipped because someone else already claimed them this pass
    pub already_claimed: usize,
    /// Candidate pairs ruled out by orientation and sex
    pub incompatible: usize,
    /// Candidate pairs that reached a draw
    pub evaluated: usize,
    /// New couples as (initiator, partner), in formation order
    pub formed: Vec<(PersonId, PersonId)>,
    /// Pairs skipped because an attribute vector was degenerate
    pub degenerate: usize,
}

/// Pair singles up.
///
/// Initiators and their candidates are both drawn from the singles pool as
/// it stood when the pass began. An initiator stops at the first accepted
/// candidate, and anyone paired earlier in the pass is passed over.
pub fn form_romances<R: RandomSource + ?Sized>(
    graph: &mut RelationshipGraph,
    params: &RomanceParams,
    rng: &mut R,
) -> RomanceOutcome {
    let singles: Vec<PersonId> = graph.singles().iter().copied().collect();
    let sample_size = clamp_to_pool(params.sample_pool, singles.len(), "romance sample");
    let pool_size = clamp_to_pool(params.candidate_pool, singles.len(), "romance candidates");

    let mut outcome = RomanceOutcome::default();

    for initiator in rng.sample(&singles, sample_size) {
        outcome.initiators += 1;
        if !graph.is_single(initiator) {
            outcome.already_claimed += 1;
            continue;
        }

        for candidate in rng.sample(&singles, pool_size) {
            if candidate == initiator || !graph.is_single(candidate) {
                continue;
            }

            let probability = match romance_probability(graph, initiator, candidate, params) {
                Ok(Some(p)) => p,
                Ok(None) => {
                    outcome.incompatible += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Skipping romance {} -> {}: {}", initiator, candidate, e);
                    outcome.degenerate += 1;
                    continue;
                }
            };

            let draw = rng.uniform();
            outcome.evaluated += 1;
            trace!("romance {} -> {}: p={:.2} draw={:.3}", initiator, candidate, probability, draw);

            if draw <= probability {
                graph.begin_romance(initiator, candidate);
                outcome.formed.push((initiator, candidate));
                break;
            }
        }
    }

    debug!(
        "Romance pass: {} initiators, {} pairs scored, {} new couples, {} singles left",
        outcome.initiators,
        outcome.evaluated,
        outcome.formed.len(),
        graph.singles().len()
    );
    outcome
}

/// Chance that `initiator` and `candidate` get together, or `None` if they can't
pub fn romance_probability(
    graph: &RelationshipGraph,
    initiator: PersonId,
    candidate: PersonId,
    params: &RomanceParams,
) -> crate::error::Result<Option<f64>> {
    let me = graph.person(initiator);
    let them = graph.person(candidate);

    if compatibility::incompatible(&me.attributes, &them.attributes) {
        return Ok(None);
    }

    let mut probability = 1.0;
    if me.is_friend(candidate) {
        probability -= params.friend_penalty;
    }
    if me.is_ex(candidate) {
        probability -= params.ex_penalty;
    }

    // An ex now dating someone who used to date the candidate closes a 4-cycle.
    // Exes who are single right now never count.
    for ex in me.exes() {
        if let Some(ex_partner) = graph.person(*ex).current_partner() {
            if graph.person(ex_partner).is_ex(candidate) {
                probability -= params.cycle_penalty;
            }
        }
    }

    let theta = affinity::angle(&me.attributes, &them.attributes)?;
    probability -= params.penalties.bonding_penalty(theta);

    Ok(Some(probability))
}
