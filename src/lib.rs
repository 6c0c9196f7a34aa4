//! Affinity network: a generational simulation of friendship and romance.
//!
//! A fixed population of people, each described by nine integer attributes,
//! befriends, dates and breaks up over discrete generations. The odds of every
//! tie depend on the angle between two people's attribute vectors.

pub mod affinity;
pub mod analysis;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod observation;
pub mod observer;
pub mod person;
pub mod population;
pub mod random;
pub mod simulator;

#[cfg(test)]
mod test_support;

pub use config::SimulationConfig;
pub use error::{NetworkError, Result};
pub use graph::{Couple, Edge, EdgeKind, RelationshipGraph};
pub use person::{Attributes, Orientation, Person, PersonId, Sex};
pub use random::{RandomSource, SimRng};
pub use simulator::{GenerationReport, Simulator};
