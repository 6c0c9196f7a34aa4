//! The population arena and its relationship edges.
//!
//! People are addressed by [`PersonId`], an index into the arena. Every
//! relation is stored on both people and mirrored by a tagged edge, and the
//! population is partitioned into singles and couples at all times.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::{NetworkError, Result};
use crate::person::{Attributes, Person, PersonId};
use crate::population::PersonRecord;

/// What an edge between two people stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Friendship,
    /// A couple that is currently together
    Romance,
    /// A couple that broke up
    PastRomance,
}

/// An undirected, tagged edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub a: PersonId,
    pub b: PersonId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn couple(&self) -> Couple {
        Couple::new(self.a, self.b)
    }
}

/// Insertion-ordered edge handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(usize);

/// Unordered pair of two distinct people, stored lowest id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Couple(PersonId, PersonId);

impl Couple {
    pub fn new(a: PersonId, b: PersonId) -> Self {
        assert_ne!(a, b, "a person cannot pair with themselves");
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn first(&self) -> PersonId {
        self.0
    }

    pub fn second(&self) -> PersonId {
        self.1
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.0 == id || self.1 == id
    }

    /// The other member, if `id` is one of them
    pub fn partner_of(&self, id: PersonId) -> Option<PersonId> {
        if self.0 == id {
            Some(self.1)
        } else if self.1 == id {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for Couple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// The whole population plus every relationship between its members
#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    people: Vec<Person>,
    edges: BTreeMap<EdgeId, Edge>,
    next_edge: usize,
    friendships: HashMap<Couple, EdgeId>,
    /// Current couples and their romance edge
    paired: BTreeMap<Couple, EdgeId>,
    singles: BTreeSet<PersonId>,
}

impl RelationshipGraph {
    /// Build a network where everybody starts single and unconnected
    pub fn new(members: Vec<(String, Attributes)>) -> Result<Self> {
        if members.is_empty() {
            return Err(NetworkError::EmptyPopulation);
        }

        let people: Vec<Person> = members
            .into_iter()
            .enumerate()
            .map(|(i, (name, attributes))| Person::new(PersonId(i), name, attributes))
            .collect();
        let singles = people.iter().map(|p| p.id).collect();

        Ok(Self {
            people,
            edges: BTreeMap::new(),
            next_edge: 0,
            friendships: HashMap::new(),
            paired: BTreeMap::new(),
            singles,
        })
    }

    /// Build from supplier records, validating every attribute payload
    pub fn from_records(records: &[PersonRecord]) -> Result<Self> {
        let members = records
            .iter()
            .map(|r| Ok((r.name.clone(), r.validate()?)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(members)
    }

    // ==================== Queries ====================

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn ids(&self) -> Vec<PersonId> {
        self.people.iter().map(|p| p.id).collect()
    }

    /// Panics on an id that is not part of this network
    pub fn person(&self, id: PersonId) -> &Person {
        &self.people[id.index()]
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id.index())
    }

    pub fn singles(&self) -> &BTreeSet<PersonId> {
        &self.singles
    }

    pub fn is_single(&self, id: PersonId) -> bool {
        self.singles.contains(&id)
    }

    /// Current couples in id order
    pub fn couples(&self) -> Vec<Couple> {
        self.paired.keys().copied().collect()
    }

    pub fn couple_count(&self) -> usize {
        self.paired.len()
    }

    pub fn is_paired(&self, couple: Couple) -> bool {
        self.paired.contains_key(&couple)
    }

    pub fn are_friends(&self, a: PersonId, b: PersonId) -> bool {
        self.person(a).is_friend(b)
    }

    pub fn friendship_count(&self) -> usize {
        self.friendships.len()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self, kind: EdgeKind) -> usize {
        self.edges.values().filter(|e| e.kind == kind).count()
    }

    // ==================== Mutations ====================

    fn push_edge(&mut self, couple: Couple, kind: EdgeKind) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(
            id,
            Edge {
                a: couple.first(),
                b: couple.second(),
                kind,
            },
        );
        id
    }

    /// Befriend two people. Returns false if they already were friends.
    pub fn add_friendship(&mut self, a: PersonId, b: PersonId) -> bool {
        let couple = Couple::new(a, b);
        if self.friendships.contains_key(&couple) {
            return false;
        }

        self.people[a.index()].friends.insert(b);
        self.people[b.index()].friends.insert(a);
        let edge = self.push_edge(couple, EdgeKind::Friendship);
        self.friendships.insert(couple, edge);
        true
    }

    /// End a friendship. Returns false if there was none.
    pub fn remove_friendship(&mut self, a: PersonId, b: PersonId) -> bool {
        let couple = Couple::new(a, b);
        let Some(edge) = self.friendships.remove(&couple) else {
            return false;
        };

        self.edges.remove(&edge);
        self.people[a.index()].friends.remove(&b);
        self.people[b.index()].friends.remove(&a);
        true
    }

    /// Put two singles in a relationship.
    ///
    /// Panics if either of them is already taken.
    pub fn begin_romance(&mut self, a: PersonId, b: PersonId) -> Couple {
        let couple = Couple::new(a, b);
        assert!(
            self.is_single(a) && self.is_single(b),
            "romance between {} and {} needs two singles",
            a,
            b
        );

        self.people[a.index()].current_partner = Some(b);
        self.people[b.index()].current_partner = Some(a);
        self.singles.remove(&a);
        self.singles.remove(&b);
        let edge = self.push_edge(couple, EdgeKind::Romance);
        self.paired.insert(couple, edge);
        couple
    }

    /// Break a couple up. Both return to the singles pool and become each other's ex.
    ///
    /// Returns false, changing nothing, if the couple is not together.
    pub fn end_romance(&mut self, couple: Couple) -> bool {
        let Some(edge) = self.paired.remove(&couple) else {
            return false;
        };

        let (a, b) = (couple.first(), couple.second());
        for (me, them) in [(a, b), (b, a)] {
            let person = &mut self.people[me.index()];
            person.current_partner = None;
            person.exes.insert(them);
            self.singles.insert(me);
        }

        let e = self
            .edges
            .get_mut(&edge)
            .unwrap_or_else(|| panic!("couple {} has no romance edge", couple));
        e.kind = EdgeKind::PastRomance;
        true
    }

    // ==================== Invariants ====================

    /// Panic unless every structural invariant holds
    pub fn assert_consistent(&self) {
        let mut in_couples = BTreeSet::new();
        for (couple, edge_id) in &self.paired {
            let (a, b) = (couple.first(), couple.second());
            assert!(in_couples.insert(a) && in_couples.insert(b), "{} is in two couples", couple);
            assert_eq!(self.person(a).current_partner, Some(b), "partner of {} is not {}", a, b);
            assert_eq!(self.person(b).current_partner, Some(a), "partner of {} is not {}", b, a);

            let edge = self.edges.get(edge_id).unwrap_or_else(|| panic!("couple {} has no edge", couple));
            assert_eq!(edge.kind, EdgeKind::Romance);
            assert_eq!(edge.couple(), *couple);
        }

        assert!(self.singles.is_disjoint(&in_couples), "singles overlap couples");
        assert_eq!(self.singles.len() + in_couples.len(), self.people.len(), "partition misses people");
        assert_eq!(self.edge_count(EdgeKind::Romance), self.paired.len());
        assert_eq!(self.edge_count(EdgeKind::Friendship), self.friendships.len());

        for (index, person) in self.people.iter().enumerate() {
            let id = person.id;
            assert_eq!(id.index(), index, "arena slot {} holds {}", index, id);
            assert_eq!(person.current_partner.is_none(), self.singles.contains(&id));

            for friend in &person.friends {
                assert_ne!(*friend, id, "{} befriended themselves", id);
                assert!(self.person(*friend).friends.contains(&id), "friendship {}-{} is one-sided", id, friend);
                assert!(self.friendships.contains_key(&Couple::new(id, *friend)));
            }
            for ex in &person.exes {
                assert_ne!(*ex, id, "{} is their own ex", id);
                assert!(self.person(*ex).exes.contains(&id), "ex {}-{} is one-sided", id, ex);
            }
        }

        for couple in self.friendships.keys() {
            assert!(self.person(couple.first()).friends.contains(&couple.second()));
        }
    }
}
