use anyhow::Result;
use tracing::{debug, info};

use crate::analysis::NetworkSummary;
use crate::config::SimulationConfig;
use crate::graph::RelationshipGraph;
use crate::lifecycle::{
    compute_breakups, form_friendships, form_romances, BreakupOutcome, FriendshipOutcome,
    RomanceOutcome,
};
use crate::observation::Event;
use crate::observer::{GraphSnapshot, Observer};
use crate::population;
use crate::random::{RandomSource, SimRng};

/// What happened during one generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub romance: RomanceOutcome,
    pub breakup: BreakupOutcome,
    pub friendship: FriendshipOutcome,
    /// Whether observers received a snapshot
    pub checkpoint: bool,
}

/// Drives the network through its generations
pub struct Simulator<R: RandomSource = SimRng> {
    config: SimulationConfig,
    graph: RelationshipGraph,
    rng: R,
    generation: usize,
    observers: Vec<Box<dyn Observer>>,
    initialized: bool,
}

impl Simulator<SimRng> {
    /// Build the population described by the config and seed the RNG from it
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        let mut rng = SimRng::new(config.simulation.seed);

        let roster = if config.population.people.is_empty() {
            population::generate(config.population.count, rng.inner())
        } else {
            config.population.people.clone()
        };
        let graph = RelationshipGraph::from_records(&roster)?;

        Ok(Self::new(config, graph, rng))
    }
}

impl<R: RandomSource> Simulator<R> {
    pub fn new(config: SimulationConfig, graph: RelationshipGraph, rng: R) -> Self {
        Self {
            config,
            graph,
            rng,
            generation: 0,
            observers: Vec::new(),
            initialized: false,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    // ==================== Observer Interface ====================

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Generations completed so far
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn total_generations(&self) -> usize {
        self.config.simulation.generations
    }

    pub fn is_complete(&self) -> bool {
        self.generation >= self.config.simulation.generations
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.graph, self.generation)
    }

    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary::of(&self.graph)
    }

    /// Snapshots are taken once the whole generation (romance, breakups and
    /// friendships) is done, so `GraphSnapshot::generation` always names a
    /// completed generation. A plot taken between romance and breakups is not
    /// available; observers that want it can rebuild it from the events.
    fn is_checkpoint(&self, generation: usize) -> bool {
        let interval = self.config.simulation.checkpoint_interval;
        interval > 0 && generation % interval == 0
    }

    fn emit(&mut self, event: Event) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_event(&event)?;
        }
        Ok(())
    }

    fn emit_all(&mut self, events: Vec<Event>) -> Result<()> {
        for event in events {
            self.emit(event)?;
        }
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.emit(Event::checkpoint(self.generation))?;
        for observer in &mut self.observers {
            observer.on_checkpoint(&snapshot)?;
        }
        Ok(())
    }

    // ==================== Lifecycle ====================

    /// Announce the run and, if configured, seed friendships before generation 1
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        let title = self.config.meta.name.clone();
        for observer in &mut self.observers {
            observer.on_start(&title, &self.graph)?;
        }

        if self.config.simulation.initial_friendships {
            let outcome = form_friendships(&mut self.graph, &self.config.friendship, &mut self.rng);
            info!("Initial friendship pass: {} friendships", outcome.formed.len());
            self.emit_all(friendship_events(0, &outcome))?;
        }

        if self.config.simulation.checkpoint_interval > 0 {
            self.checkpoint()?;
        }
        Ok(())
    }

    /// Run one generation: romance, then breakups, then friendships
    pub fn step(&mut self) -> Result<GenerationReport> {
        if !self.initialized {
            self.initialize()?;
        }

        let generation = self.generation + 1;
        debug!("Generation {} starting", generation);
        self.emit(Event::generation_start(generation))?;

        // 1. Singles pair up
        let romance = form_romances(&mut self.graph, &self.config.romance, &mut self.rng);
        let events = romance
            .formed
            .iter()
            .map(|&(a, b)| Event::romance_formed(generation, a, b))
            .collect();
        self.emit_all(events)?;

        // 2. Couples (including brand new ones) may split
        let breakup = compute_breakups(&mut self.graph, &self.config.breakup, &mut self.rng);
        let mut events: Vec<Event> = breakup.ended.iter().map(|&c| Event::broke_up(generation, c)).collect();
        events.extend(breakup.friendships_lost.iter().map(|&c| Event::friendship_ended(generation, c)));
        self.emit_all(events)?;

        // 3. Everyone may make friends
        let friendship = form_friendships(&mut self.graph, &self.config.friendship, &mut self.rng);
        self.emit_all(friendship_events(generation, &friendship))?;

        #[cfg(debug_assertions)]
        self.graph.assert_consistent();

        self.generation = generation;
        self.emit(Event::generation_end(generation))?;

        let checkpoint = self.is_checkpoint(generation);
        if checkpoint {
            self.checkpoint()?;
        }

        if generation % 10 == 0 {
            let summary = self.summary();
            info!(
                "Generation {}: {} couples, {} singles, {} friendships",
                generation, summary.couples, summary.singles, summary.friendships
            );
        }

        Ok(GenerationReport {
            generation,
            romance,
            breakup,
            friendship,
            checkpoint,
        })
    }

    /// Hand the final state to observers
    pub fn finalize(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_finish(&snapshot)?;
        }
        Ok(())
    }

    /// Run every configured generation
    pub fn run(&mut self) -> Result<()> {
        info!(
            "Starting simulation: {} people, {} generations",
            self.graph.len(),
            self.config.simulation.generations
        );

        self.initialize()?;
        while !self.is_complete() {
            self.step()?;
        }
        self.finalize()?;

        info!("Simulation complete after {} generations", self.generation);
        Ok(())
    }
}

fn friendship_events(generation: usize, outcome: &FriendshipOutcome) -> Vec<Event> {
    outcome
        .formed
        .iter()
        .map(|&(a, b)| Event::friendship_formed(generation, a, b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::PenaltyTable;
    use crate::config::{BreakupParams, FriendshipParams, RomanceParams};
    use crate::graph::{Couple, Edge, EdgeKind};
    use crate::observation::EventType;
    use crate::person::{Orientation, PersonId, Sex};
    use crate::random::ScriptedSource;
    use crate::test_support::{attrs, network};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares what it sees with the test through an Rc
    #[derive(Default)]
    struct Recorder {
        started: bool,
        events: Vec<Event>,
        checkpoints: Vec<usize>,
        last_checkpoint: Option<GraphSnapshot>,
        finished: Option<usize>,
    }

    struct RecorderHandle(Rc<RefCell<Recorder>>);

    impl Observer for RecorderHandle {
        fn on_start(&mut self, _title: &str, _graph: &RelationshipGraph) -> Result<()> {
            self.0.borrow_mut().started = true;
            Ok(())
        }

        fn on_event(&mut self, event: &Event) -> Result<()> {
            self.0.borrow_mut().events.push(event.clone());
            Ok(())
        }

        fn on_checkpoint(&mut self, snapshot: &GraphSnapshot) -> Result<()> {
            let mut seen = self.0.borrow_mut();
            seen.checkpoints.push(snapshot.generation);
            seen.last_checkpoint = Some(snapshot.clone());
            Ok(())
        }

        fn on_finish(&mut self, snapshot: &GraphSnapshot) -> Result<()> {
            self.0.borrow_mut().finished = Some(snapshot.generation);
            Ok(())
        }
    }

    fn config(generations: usize, checkpoint_interval: usize) -> SimulationConfig {
        let mut config = SimulationConfig::default_with(0, generations, Some(1));
        config.simulation.checkpoint_interval = checkpoint_interval;
        config.simulation.initial_friendships = false;
        config
    }

    /// Two straight couples-to-be with very different hobbies across pairs
    fn four() -> RelationshipGraph {
        network(vec![
            attrs(Sex::Male, Orientation::Straight, 1),
            attrs(Sex::Female, Orientation::Straight, 1),
            attrs(Sex::Male, Orientation::Straight, -10),
            attrs(Sex::Female, Orientation::Straight, 10),
        ])
    }

    /// Four people, every pair scanned, and a draw script for exactly one generation
    fn scripted(checkpoint_interval: usize) -> Simulator<ScriptedSource> {
        let mut config = config(1, checkpoint_interval);
        config.romance = RomanceParams {
            sample_pool: 4,
            candidate_pool: 4,
            ..RomanceParams::default()
        };
        config.friendship = FriendshipParams {
            sample_size: 1,
            candidate_pool: 4,
            ..FriendshipParams::default()
        };
        let rng = ScriptedSource::new(vec![0.5, 0.5, 0.5, 0.1, 0.9, 0.2]);
        Simulator::new(config, four(), rng)
    }

    #[test]
    fn test_scripted_generation_edge_set() {
        // Draw script, in consumption order:
        //  romance    P0 meets P1, p 0.7            0.5 accept
        //             P1 is taken; P2 meets P3, p 0.6  0.5 accept
        //  breakup    P0-P1, p 0.05                 0.5 stay
        //             P2-P3, p 0.25                 0.1 split
        //  friendship P0 meets P2, p 0.7            0.9 reject
        //             P0 meets P3, p 0.7            0.2 accept
        let mut sim = scripted(0);

        let report = sim.step().unwrap();

        assert_eq!(report.generation, 1);
        assert_eq!(report.romance.formed, vec![(PersonId(0), PersonId(1)), (PersonId(2), PersonId(3))]);
        assert_eq!(report.romance.already_claimed, 2);
        assert_eq!(report.breakup.ended, vec![Couple::new(PersonId(2), PersonId(3))]);
        assert_eq!(report.friendship.formed, vec![(PersonId(0), PersonId(3))]);
        assert_eq!(sim.rng.uniforms_drawn, 6);

        let edges: Vec<Edge> = sim.graph().edges().copied().collect();
        assert_eq!(
            edges,
            vec![
                Edge { a: PersonId(0), b: PersonId(1), kind: EdgeKind::Romance },
                Edge { a: PersonId(2), b: PersonId(3), kind: EdgeKind::PastRomance },
                Edge { a: PersonId(0), b: PersonId(3), kind: EdgeKind::Friendship },
            ]
        );
        assert!(sim.graph().person(PersonId(2)).is_ex(PersonId(3)));
        sim.graph().assert_consistent();
    }

    #[test]
    fn test_checkpoint_sees_completed_generation() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut sim = scripted(1);
        sim.add_observer(Box::new(RecorderHandle(Rc::clone(&recorder))));

        let report = sim.step().unwrap();
        assert!(report.checkpoint);

        let seen = recorder.borrow();
        assert_eq!(seen.checkpoints, vec![0, 1]);
        let snapshot = seen.last_checkpoint.as_ref().unwrap();
        assert_eq!(snapshot.generation, 1);
        // Breakups and the friendship pass are already reflected
        assert_eq!(snapshot.edges_of(EdgeKind::PastRomance).count(), 1);
        assert_eq!(snapshot.edges_of(EdgeKind::Romance).count(), 1);
        assert_eq!(snapshot.edges_of(EdgeKind::Friendship).count(), 1);
        assert_eq!(snapshot.people[2].partner, None);
        assert_eq!(snapshot, &sim.snapshot());
    }

    #[test]
    fn test_pairs_then_never_breaks_up_with_zero_base() {
        let mut config = config(3, 0);
        config.breakup = BreakupParams {
            base_probability: 0.0,
            ..BreakupParams::default()
        };
        config.romance.penalties = PenaltyTable([0.0; 4]);
        let graph = network(vec![
            attrs(Sex::Female, Orientation::Gay, 3),
            attrs(Sex::Female, Orientation::Gay, 3),
        ]);
        let mut sim = Simulator::new(config, graph, ScriptedSource::always_accept());

        sim.run().unwrap();

        // Identical partners: 0.0 - 0.9 < 0, so a zero draw still keeps them together
        assert_eq!(sim.graph().couple_count(), 1);
        assert!(sim.graph().singles().is_empty());
        assert!(!sim.graph().are_friends(PersonId(0), PersonId(1)));
    }

    #[test]
    fn test_oversized_samples_on_tiny_population() {
        let mut config = SimulationConfig::default_with(3, 2, Some(5));
        config.romance.sample_pool = 50;
        config.romance.candidate_pool = 50;
        config.friendship.sample_size = 70;
        config.friendship.candidate_pool = 30;

        let mut sim = Simulator::from_config(config).unwrap();
        sim.run().unwrap();

        assert_eq!(sim.generation(), 2);
        sim.graph().assert_consistent();
    }

    #[test]
    fn test_checkpoint_cadence_and_hooks() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut config = config(7, 3);
        config.population.count = 12;
        let mut sim = Simulator::from_config(config).unwrap();
        sim.add_observer(Box::new(RecorderHandle(Rc::clone(&recorder))));
        sim.run().unwrap();

        let recorder = recorder.borrow();
        assert!(recorder.started);
        assert_eq!(recorder.checkpoints, vec![0, 3, 6]);
        assert_eq!(recorder.finished, Some(7));

        let starts: Vec<usize> = recorder
            .events
            .iter()
            .filter(|e| e.event_type == EventType::GenerationStart)
            .map(|e| e.generation)
            .collect();
        assert_eq!(starts, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = |seed| {
            let mut config = SimulationConfig::default_with(40, 15, Some(seed));
            config.simulation.checkpoint_interval = 0;
            let mut sim = Simulator::from_config(config).unwrap();
            sim.run().unwrap();
            sim.snapshot()
        };

        assert_eq!(run(2024), run(2024));
    }

    #[test]
    fn test_long_run_keeps_invariants() {
        let mut config = SimulationConfig::default_with(60, 0, Some(9));
        config.simulation.checkpoint_interval = 0;
        let mut sim = Simulator::from_config(config).unwrap();
        sim.initialize().unwrap();

        for _ in 0..40 {
            let report = sim.step().unwrap();
            let graph = sim.graph();
            graph.assert_consistent();
            for couple in &report.breakup.ended {
                assert!(graph.person(couple.first()).is_ex(couple.second()));
            }
        }
        assert_eq!(sim.generation(), 40);
    }

    #[test]
    fn test_empty_roster_fails() {
        let config = SimulationConfig::default_with(0, 1, Some(1));
        assert!(Simulator::from_config(config).is_err());
    }
}
