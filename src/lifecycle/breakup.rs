use tracing::{debug, trace, warn};

use crate::affinity;
use crate::config::BreakupParams;
use crate::graph::{Couple, RelationshipGraph};
use crate::random::RandomSource;

/// What one breakup pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakupOutcome {
    /// Couples that reached a draw
    pub evaluated: usize,
    /// Couples that split, in id order
    pub ended: Vec<Couple>,
    /// Split couples whose friendship ended too
    pub friendships_lost: Vec<Couple>,
    /// Couples skipped because an attribute vector was degenerate
    pub degenerate: usize,
}

/// Give every current couple a chance to split.
///
/// The more alike two partners are, the less likely they break up. Partners
/// who were also friends may lose the friendship with the romance; that
/// extra draw only happens for them.
pub fn compute_breakups<R: RandomSource + ?Sized>(
    graph: &mut RelationshipGraph,
    params: &BreakupParams,
    rng: &mut R,
) -> BreakupOutcome {
    let mut outcome = BreakupOutcome::default();

    for couple in graph.couples() {
        let (a, b) = (couple.first(), couple.second());

        let theta = match affinity::angle(&graph.person(a).attributes, &graph.person(b).attributes) {
            Ok(theta) => theta,
            Err(e) => {
                warn!("Skipping breakup check for {}: {}", couple, e);
                outcome.degenerate += 1;
                continue;
            }
        };
        let probability = params.base_probability - params.penalties.breakup_bonus(theta);

        let draw = rng.uniform();
        outcome.evaluated += 1;
        trace!("breakup {}: p={:.2} draw={:.3}", couple, probability, draw);

        if draw > probability {
            continue;
        }

        graph.end_romance(couple);
        outcome.ended.push(couple);

        if graph.are_friends(a, b) && rng.uniform() <= params.friendship_loss {
            graph.remove_friendship(a, b);
            outcome.friendships_lost.push(couple);
        }
    }

    debug!(
        "Breakup pass: {} couples checked, {} split, {} friendships lost",
        outcome.evaluated,
        outcome.ended.len(),
        outcome.friendships_lost.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use crate::person::{Orientation, PersonId, Sex};
    use crate::random::{ScriptedSource, SimRng};
    use crate::test_support::{attrs, network};

    fn four() -> RelationshipGraph {
        network(vec![
            attrs(Sex::Male, Orientation::Straight, 2),
            attrs(Sex::Female, Orientation::Straight, 2),
            attrs(Sex::Male, Orientation::Straight, -9),
            attrs(Sex::Female, Orientation::Straight, 9),
        ])
    }

    #[test]
    fn test_no_couples_no_change() {
        let mut graph = four();
        graph.add_friendship(PersonId(0), PersonId(3));
        let before = graph.clone();
        let mut rng = ScriptedSource::always_accept();

        let outcome = compute_breakups(&mut graph, &BreakupParams::default(), &mut rng);

        assert_eq!(outcome, BreakupOutcome::default());
        assert_eq!(rng.uniforms_drawn, 0);
        assert_eq!(graph.singles(), before.singles());
        assert_eq!(graph.edges().collect::<Vec<_>>(), before.edges().collect::<Vec<_>>());
    }

    #[test]
    fn test_breakup_makes_exes() {
        let mut graph = four();
        let couple = graph.begin_romance(PersonId(0), PersonId(1));
        let mut rng = ScriptedSource::always_accept();

        let outcome = compute_breakups(&mut graph, &BreakupParams::default(), &mut rng);

        assert_eq!(outcome.ended, vec![couple]);
        assert_eq!(graph.singles().len(), 4);
        assert_eq!(graph.couple_count(), 0);
        assert!(graph.person(PersonId(0)).is_ex(PersonId(1)));
        assert!(graph.person(PersonId(1)).is_ex(PersonId(0)));
        assert_eq!(graph.edge_count(EdgeKind::PastRomance), 1);
        graph.assert_consistent();

        // Nothing left to break up
        let again = compute_breakups(&mut graph, &BreakupParams::default(), &mut rng);
        assert!(again.ended.is_empty());
        assert_eq!(graph.person(PersonId(0)).exes().len(), 1);
    }

    #[test]
    fn test_similar_couple_more_stable() {
        // P0/P1 sit in the first quartile: 0.95 - 0.9 = 0.05
        let mut graph = four();
        graph.begin_romance(PersonId(0), PersonId(1));
        let mut rng = ScriptedSource::new(vec![0.06]);

        let outcome = compute_breakups(&mut graph, &BreakupParams::default(), &mut rng);
        assert!(outcome.ended.is_empty());
        assert_eq!(outcome.evaluated, 1);
        assert_eq!(graph.couple_count(), 1);
    }

    #[test]
    fn test_friendship_may_end_with_romance() {
        let mut graph = four();
        graph.add_friendship(PersonId(0), PersonId(1));
        graph.add_friendship(PersonId(2), PersonId(3));
        let c01 = graph.begin_romance(PersonId(0), PersonId(1));
        let c23 = graph.begin_romance(PersonId(2), PersonId(3));

        // c01: split (0.0), friendship lost (0.5 <= 0.9)
        // c23: split (0.0), friendship kept (0.95 > 0.9)
        let mut rng = ScriptedSource::new(vec![0.0, 0.5, 0.0, 0.95]);
        let outcome = compute_breakups(&mut graph, &BreakupParams::default(), &mut rng);

        assert_eq!(outcome.ended, vec![c01, c23]);
        assert_eq!(outcome.friendships_lost, vec![c01]);
        assert!(!graph.are_friends(PersonId(0), PersonId(1)));
        assert!(graph.are_friends(PersonId(2), PersonId(3)));
        assert_eq!(rng.uniforms_drawn, 4);
        graph.assert_consistent();
    }

    #[test]
    fn test_random_breakups_keep_invariants() {
        let mut graph = four();
        graph.begin_romance(PersonId(0), PersonId(1));
        graph.begin_romance(PersonId(2), PersonId(3));
        let mut rng = SimRng::seed_from_u64(77);

        compute_breakups(&mut graph, &BreakupParams::default(), &mut rng);
        graph.assert_consistent();
    }
}
