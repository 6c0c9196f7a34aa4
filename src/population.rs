//! Population supplier types.
//!
//! The network never reads name files itself. Callers hand it
//! [`PersonRecord`]s, either parsed from configuration or generated here.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::person::{Attributes, Sex};

/// A name plus an integer-coded attribute mapping, as supplied from outside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub attributes: BTreeMap<String, i64>,
}

impl PersonRecord {
    pub fn new(name: impl Into<String>, attributes: &Attributes) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.to_map(),
        }
    }

    /// Check the payload and turn it into a fixed-shape record
    pub fn validate(&self) -> Result<Attributes> {
        Attributes::from_map(&self.name, &self.attributes)
    }
}

/// Names for generated rosters, with their sex
const NAMES: &[(&str, Sex)] = &[
    ("Aric", Sex::Male),
    ("Bria", Sex::Female),
    ("Corin", Sex::Male),
    ("Dara", Sex::Female),
    ("Elwyn", Sex::Male),
    ("Faye", Sex::Female),
    ("Garen", Sex::Male),
    ("Hana", Sex::Female),
    ("Isen", Sex::Male),
    ("Jora", Sex::Female),
    ("Kael", Sex::Male),
    ("Lira", Sex::Female),
    ("Maren", Sex::Female),
    ("Niko", Sex::Male),
    ("Orin", Sex::Male),
    ("Petra", Sex::Female),
    ("Quinn", Sex::Male),
    ("Rhea", Sex::Female),
    ("Soren", Sex::Male),
    ("Talia", Sex::Female),
];

/// Generate `count` people with random attributes.
///
/// Names are drawn from a fixed pool; once it runs out they repeat with a
/// numeric suffix so every name stays unique.
pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<PersonRecord> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut records = Vec::with_capacity(count);

    while records.len() < count {
        let mut round: Vec<&(&str, Sex)> = NAMES.iter().collect();
        round.shuffle(rng);

        for (name, sex) in round.into_iter().take(count - records.len()) {
            let n = seen.entry(*name).or_insert(0);
            *n += 1;
            let unique = if *n == 1 {
                name.to_string()
            } else {
                format!("{} {}", name, n)
            };

            let attributes = Attributes::random(rng, *sex);
            records.push(PersonRecord::new(unique, &attributes));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::graph::RelationshipGraph;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_count_and_unique_names() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let roster = generate(55, &mut rng);
        assert_eq!(roster.len(), 55);

        let names: HashSet<_> = roster.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 55);
        assert!(roster.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let a = generate(12, &mut ChaCha8Rng::seed_from_u64(4));
        let b = generate(12, &mut ChaCha8Rng::seed_from_u64(4));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_record_fails_network_construction() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut roster = generate(3, &mut rng);
        roster[1].attributes.insert("music".to_string(), 9);

        match RelationshipGraph::from_records(&roster) {
            Err(NetworkError::InvalidAttributes { name, .. }) => assert_eq!(name, roster[1].name),
            other => panic!("expected InvalidAttributes, got {:?}", other),
        }
    }
}
