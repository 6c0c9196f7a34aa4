use serde::{Deserialize, Serialize};

use crate::graph::Couple;
use crate::person::PersonId;

/// A simulation event for logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub generation: usize,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<PersonId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    // Relationships
    FriendshipFormed,
    FriendshipEnded,
    RomanceFormed,
    BrokeUp,

    // Meta
    GenerationStart,
    GenerationEnd,
    Checkpoint,
}

impl Event {
    fn meta(generation: usize, event_type: EventType) -> Self {
        Self {
            generation,
            event_type,
            person: None,
            other: None,
        }
    }

    fn between(generation: usize, event_type: EventType, person: PersonId, other: PersonId) -> Self {
        Self {
            generation,
            event_type,
            person: Some(person),
            other: Some(other),
        }
    }

    pub fn generation_start(generation: usize) -> Self {
        Self::meta(generation, EventType::GenerationStart)
    }

    pub fn generation_end(generation: usize) -> Self {
        Self::meta(generation, EventType::GenerationEnd)
    }

    pub fn checkpoint(generation: usize) -> Self {
        Self::meta(generation, EventType::Checkpoint)
    }

    pub fn friendship_formed(generation: usize, initiator: PersonId, friend: PersonId) -> Self {
        Self::between(generation, EventType::FriendshipFormed, initiator, friend)
    }

    pub fn friendship_ended(generation: usize, couple: Couple) -> Self {
        Self::between(generation, EventType::FriendshipEnded, couple.first(), couple.second())
    }

    pub fn romance_formed(generation: usize, initiator: PersonId, partner: PersonId) -> Self {
        Self::between(generation, EventType::RomanceFormed, initiator, partner)
    }

    pub fn broke_up(generation: usize, couple: Couple) -> Self {
        Self::between(generation, EventType::BrokeUp, couple.first(), couple.second())
    }
}
