//! Observer protocol for watching a run.
//!
//! Snapshots are read-only copies of the network, so renderers and writers
//! never hold a reference into the live graph.

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, EdgeKind, RelationshipGraph};
use crate::observation::Event;
use crate::person::{Attributes, Person, PersonId};

/// View of one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonView {
    pub id: PersonId,
    pub name: String,
    pub attributes: Attributes,
    pub partner: Option<PersonId>,
    pub friends: Vec<PersonId>,
    pub exes: Vec<PersonId>,
}

/// The whole network at one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub generation: usize,
    /// In id order
    pub people: Vec<PersonView>,
    /// In creation order
    pub edges: Vec<Edge>,
}

impl PersonView {
    pub fn from_person(person: &Person) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            attributes: person.attributes.clone(),
            partner: person.current_partner(),
            friends: person.friends().iter().copied().collect(),
            exes: person.exes().iter().copied().collect(),
        }
    }
}

impl GraphSnapshot {
    pub fn capture(graph: &RelationshipGraph, generation: usize) -> Self {
        Self {
            generation,
            people: graph.people().iter().map(PersonView::from_person).collect(),
            edges: graph.edges().copied().collect(),
        }
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}

/// Something that watches a simulation: a chronicle writer, a renderer, a test probe.
///
/// Every hook has a no-op default.
pub trait Observer {
    /// Called once before the first generation
    fn on_start(&mut self, _title: &str, _graph: &RelationshipGraph) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_event(&mut self, _event: &Event) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called at each checkpoint generation
    fn on_checkpoint(&mut self, _snapshot: &GraphSnapshot) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once after the last generation
    fn on_finish(&mut self, _snapshot: &GraphSnapshot) -> anyhow::Result<()> {
        Ok(())
    }
}
