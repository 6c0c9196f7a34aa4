//! Shared fixtures for unit tests.

use crate::graph::RelationshipGraph;
use crate::person::{Attributes, Orientation, Sex};

/// Attributes that differ only where a test cares
pub fn attrs(sex: Sex, orientation: Orientation, hobby: i8) -> Attributes {
    Attributes {
        sex,
        orientation,
        age: 20,
        religion: 0,
        socio: 0,
        race: 0,
        music: 0,
        hobby,
        personality: 0,
    }
}

/// A network named P0, P1, ... in order
pub fn network(members: Vec<Attributes>) -> RelationshipGraph {
    let named = members
        .into_iter()
        .enumerate()
        .map(|(i, a)| (format!("P{}", i), a))
        .collect();
    RelationshipGraph::new(named).unwrap()
}
