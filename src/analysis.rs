//! Network-level statistics and community structure.
//!
//! Every edge (friendship, romance or past romance) counts as a link when
//! looking for communities.

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::error::{NetworkError, Result};
use crate::graph::{EdgeKind, RelationshipGraph};
use crate::observer::GraphSnapshot;
use crate::person::PersonId;
use crate::random::RandomSource;

/// Headline counts for a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub people: usize,
    pub singles: usize,
    pub couples: usize,
    pub friendships: usize,
    pub past_romances: usize,
}

impl NetworkSummary {
    pub fn of(graph: &RelationshipGraph) -> Self {
        Self {
            people: graph.len(),
            singles: graph.singles().len(),
            couples: graph.couple_count(),
            friendships: graph.friendship_count(),
            past_romances: graph.edge_count(EdgeKind::PastRomance),
        }
    }

    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        Self {
            people: snapshot.people.len(),
            singles: snapshot.people.iter().filter(|p| p.partner.is_none()).count(),
            couples: snapshot.edges_of(EdgeKind::Romance).count(),
            friendships: snapshot.edges_of(EdgeKind::Friendship).count(),
            past_romances: snapshot.edges_of(EdgeKind::PastRomance).count(),
        }
    }
}

impl fmt::Display for NetworkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network with {} people.", self.people)?;
        writeln!(f, "{} are single.", self.singles)?;
        writeln!(f, "{} are in relationships.", self.couples * 2)?;
        write!(
            f,
            "{} friendships, {} past romances.",
            self.friendships, self.past_romances
        )
    }
}

/// The snapshot as a petgraph network, one edge per linked pair.
///
/// Node `i` holds `PersonId(i)`. A pair linked more than once keeps the kind
/// of its latest edge.
pub type Network = UnGraph<PersonId, EdgeKind>;

pub fn build_network(snapshot: &GraphSnapshot) -> Network {
    let mut net = Network::with_capacity(snapshot.people.len(), snapshot.edges.len());
    let nodes: Vec<NodeIndex> = snapshot.people.iter().map(|p| net.add_node(p.id)).collect();
    for edge in &snapshot.edges {
        net.update_edge(nodes[edge.a.index()], nodes[edge.b.index()], edge.kind);
    }
    net
}

/// How to split a network into communities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommunityAlgorithm {
    /// Connected components: anyone reachable belongs together
    Components,
    /// Asynchronous label propagation with random order and tie breaks
    #[default]
    LabelPropagation,
    /// Girvan-Newman: cut the highest-betweenness edge until modularity peaks
    EdgeBetweenness,
}

impl FromStr for CommunityAlgorithm {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "components" => Ok(Self::Components),
            "label" | "label_propagation" => Ok(Self::LabelPropagation),
            "between" | "edge_betweenness" => Ok(Self::EdgeBetweenness),
            other => Err(NetworkError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for CommunityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Components => write!(f, "components"),
            Self::LabelPropagation => write!(f, "label propagation"),
            Self::EdgeBetweenness => write!(f, "edge betweenness"),
        }
    }
}

/// Connected components, largest first; ties go to the lowest member id.
///
/// Members within a community are in id order.
pub fn components(snapshot: &GraphSnapshot) -> Vec<Vec<PersonId>> {
    let net = build_network(snapshot);
    into_groups(&net, &component_labels(&net))
}

/// Community structure by the chosen algorithm, ordered like [`components`].
///
/// Only label propagation consumes randomness.
pub fn communities<R: RandomSource + ?Sized>(
    snapshot: &GraphSnapshot,
    algorithm: CommunityAlgorithm,
    rng: &mut R,
) -> Vec<Vec<PersonId>> {
    let net = build_network(snapshot);
    let labels = match algorithm {
        CommunityAlgorithm::Components => component_labels(&net),
        CommunityAlgorithm::LabelPropagation => label_propagation(&net, rng),
        CommunityAlgorithm::EdgeBetweenness => edge_betweenness_labels(&net),
    };
    let groups = into_groups(&net, &labels);
    debug!("{} found {} communities", algorithm, groups.len());
    groups
}

fn into_groups(net: &Network, labels: &[usize]) -> Vec<Vec<PersonId>> {
    let mut by_label: BTreeMap<usize, Vec<PersonId>> = BTreeMap::new();
    for node in net.node_indices() {
        by_label.entry(labels[node.index()]).or_default().push(net[node]);
    }

    let mut groups: Vec<Vec<PersonId>> = by_label.into_values().collect();
    for group in &mut groups {
        group.sort();
    }
    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    groups
}

fn component_labels(net: &Network) -> Vec<usize> {
    let mut forest = UnionFind::<usize>::new(net.node_count());
    for edge in net.edge_references() {
        forest.union(edge.source().index(), edge.target().index());
    }
    forest.into_labeling()
}

const MAX_SWEEPS: usize = 100;

/// Everyone starts with their own label and repeatedly adopts the most common
/// label among their neighbours. A label already among the most common is kept.
fn label_propagation<R: RandomSource + ?Sized>(net: &Network, rng: &mut R) -> Vec<usize> {
    let mut labels: Vec<usize> = (0..net.node_count()).collect();
    let everyone: Vec<PersonId> = net.node_indices().map(|n| net[n]).collect();

    for sweep in 1..=MAX_SWEEPS {
        let mut changed = false;

        for id in rng.sample(&everyone, everyone.len()) {
            let node = NodeIndex::new(id.index());
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for neighbor in net.neighbors(node) {
                *counts.entry(labels[neighbor.index()]).or_insert(0) += 1;
            }

            let Some(&best) = counts.values().max() else {
                continue;
            };
            if counts.get(&labels[node.index()]) == Some(&best) {
                continue;
            }

            let ties: Vec<usize> = counts
                .iter()
                .filter(|&(_, &count)| count == best)
                .map(|(&label, _)| label)
                .collect();
            let pick = ((rng.uniform() * ties.len() as f64) as usize).min(ties.len() - 1);
            labels[node.index()] = ties[pick];
            changed = true;
        }

        if !changed {
            trace!("label propagation settled after {} sweeps", sweep);
            return labels;
        }
    }

    debug!("label propagation stopped after {} sweeps", MAX_SWEEPS);
    labels
}

/// Girvan-Newman divisive clustering, keeping the split with the best modularity
fn edge_betweenness_labels(net: &Network) -> Vec<usize> {
    let mut working = net.clone();
    let mut best = component_labels(&working);
    let mut best_modularity = modularity(net, &best);
    let mut parts = distinct(&best);

    while working.edge_count() > 0 {
        let scores = edge_betweenness(&working);
        let mut top = 0;
        for (index, &score) in scores.iter().enumerate() {
            if score > scores[top] + 1e-9 {
                top = index;
            }
        }
        working.remove_edge(EdgeIndex::new(top));

        let labels = component_labels(&working);
        let count = distinct(&labels);
        if count > parts {
            parts = count;
            let q = modularity(net, &labels);
            if q > best_modularity + 1e-12 {
                best_modularity = q;
                best = labels;
            }
        }
    }

    best
}

/// Shortest-path edge betweenness (Brandes), indexed by edge index
fn edge_betweenness(net: &Network) -> Vec<f64> {
    let n = net.node_count();
    let mut scores = vec![0.0; net.edge_count()];

    for source in net.node_indices() {
        let mut order = Vec::with_capacity(n);
        let mut preds: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
        let mut paths = vec![0.0_f64; n];
        let mut dist = vec![usize::MAX; n];
        paths[source.index()] = 1.0;
        dist[source.index()] = 0;

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            let next = dist[v.index()] + 1;
            for edge in net.edges(v) {
                let w = if edge.source() == v { edge.target() } else { edge.source() };
                if dist[w.index()] == usize::MAX {
                    dist[w.index()] = next;
                    queue.push_back(w);
                }
                if dist[w.index()] == next {
                    paths[w.index()] += paths[v.index()];
                    preds[w.index()].push((v, edge.id()));
                }
            }
        }

        let mut dependency = vec![0.0_f64; n];
        while let Some(w) = order.pop() {
            for &(v, edge) in &preds[w.index()] {
                let share = paths[v.index()] / paths[w.index()] * (1.0 + dependency[w.index()]);
                scores[edge.index()] += share;
                dependency[v.index()] += share;
            }
        }
    }

    scores
}

/// Newman modularity of a labelling over the full network
fn modularity(net: &Network, labels: &[usize]) -> f64 {
    let m = net.edge_count() as f64;
    if m == 0.0 {
        return 0.0;
    }

    // label -> (internal edges, total degree)
    let mut totals: HashMap<usize, (f64, f64)> = HashMap::new();
    for edge in net.edge_references() {
        let (a, b) = (labels[edge.source().index()], labels[edge.target().index()]);
        if a == b {
            totals.entry(a).or_default().0 += 1.0;
        }
    }
    for node in net.node_indices() {
        totals.entry(labels[node.index()]).or_default().1 += net.edges(node).count() as f64;
    }

    totals
        .values()
        .map(|&(internal, degree)| internal / m - (degree / (2.0 * m)).powi(2))
        .sum()
}

fn distinct(labels: &[usize]) -> usize {
    labels.iter().collect::<BTreeSet<_>>().len()
}
