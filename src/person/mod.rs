pub mod attributes;

pub use attributes::{Attributes, Domain, Orientation, Sex, DIMENSION_COUNT, DOMAINS};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable index of a person in the population arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub usize);

impl PersonId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single agent in the network
///
/// Identity and attributes never change after construction. Relationship
/// state is only touched through [`crate::graph::RelationshipGraph`], which
/// keeps both sides of every relation in step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub attributes: Attributes,
    pub(crate) friends: BTreeSet<PersonId>,
    /// Only ever grows
    pub(crate) exes: BTreeSet<PersonId>,
    pub(crate) current_partner: Option<PersonId>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id,
            name: name.into(),
            attributes,
            friends: BTreeSet::new(),
            exes: BTreeSet::new(),
            current_partner: None,
        }
    }

    pub fn friends(&self) -> &BTreeSet<PersonId> {
        &self.friends
    }

    pub fn exes(&self) -> &BTreeSet<PersonId> {
        &self.exes
    }

    pub fn current_partner(&self) -> Option<PersonId> {
        self.current_partner
    }

    pub fn is_friend(&self, other: PersonId) -> bool {
        self.friends.contains(&other)
    }

    pub fn is_ex(&self, other: PersonId) -> bool {
        self.exes.contains(&other)
    }

    pub fn is_single(&self) -> bool {
        self.current_partner.is_none()
    }

    /// Short one-line description for chronicles
    pub fn describe(&self) -> String {
        let a = &self.attributes;
        format!(
            "{} ({}, {}, age {})",
            self.name,
            a.sex,
            a.orientation.describe(),
            a.age
        )
    }
}
