use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{NetworkError, Result};

/// Number of attribute dimensions every person carries
pub const DIMENSION_COUNT: usize = 9;

/// Closed integer range of one attribute dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub min: i8,
    pub max: i8,
}

impl Domain {
    const fn new(name: &'static str, min: i8, max: i8) -> Self {
        Self { name, min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }
}

/// The nine dimensions in canonical vector order
pub const DOMAINS: [Domain; DIMENSION_COUNT] = [
    Domain::new("sex", 0, 1),
    Domain::new("orientation", -1, 1),
    Domain::new("age", 16, 29),
    Domain::new("religion", -2, 2),
    Domain::new("socio", -1, 1),
    Domain::new("race", -2, 2),
    Domain::new("music", -5, 5),
    Domain::new("hobby", -10, 10),
    Domain::new("personality", -2, 2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Sex {
    Male,
    Female,
}

/// Romantic orientation, coded -1 / 0 / 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Orientation {
    /// Opposite sex only
    Straight,
    Bisexual,
    /// Same sex only
    Gay,
}

impl Sex {
    pub fn code(self) -> i8 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Sex::Male),
            1 => Some(Sex::Female),
            _ => None,
        }
    }
}

impl Orientation {
    pub fn code(self) -> i8 {
        match self {
            Orientation::Straight => -1,
            Orientation::Bisexual => 0,
            Orientation::Gay => 1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Orientation::Straight),
            0 => Some(Orientation::Bisexual),
            1 => Some(Orientation::Gay),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Orientation::Straight => "straight",
            Orientation::Bisexual => "bi",
            Orientation::Gay => "gay",
        }
    }
}

impl From<Sex> for i8 {
    fn from(sex: Sex) -> Self {
        sex.code()
    }
}

impl TryFrom<i8> for Sex {
    type Error = String;

    fn try_from(code: i8) -> std::result::Result<Self, Self::Error> {
        Sex::from_code(code).ok_or_else(|| format!("sex code {} not in 0..=1", code))
    }
}

impl From<Orientation> for i8 {
    fn from(orientation: Orientation) -> Self {
        orientation.code()
    }
}

impl TryFrom<i8> for Orientation {
    type Error = String;

    fn try_from(code: i8) -> std::result::Result<Self, Self::Error> {
        Orientation::from_code(code).ok_or_else(|| format!("orientation code {} not in -1..=1", code))
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "M"),
            Sex::Female => write!(f, "F"),
        }
    }
}

/// Fixed attribute vector of a person
///
/// Field order is the canonical vector order, so index `i` of
/// [`Attributes::to_vector`] means the same dimension for everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub sex: Sex,
    pub orientation: Orientation,
    pub age: i8,
    pub religion: i8,
    pub socio: i8,
    pub race: i8,
    pub music: i8,
    pub hobby: i8,
    pub personality: i8,
}

impl Attributes {
    /// Build from an integer-coded mapping of dimension name to value.
    ///
    /// Every one of the nine dimensions must be present, no other key may
    /// appear, and each value must sit inside its domain.
    pub fn from_map(name: &str, map: &BTreeMap<String, i64>) -> Result<Self> {
        if let Some(unknown) = map.keys().find(|k| !DOMAINS.iter().any(|d| d.name == k.as_str())) {
            return Err(NetworkError::invalid(name, format!("unknown dimension '{}'", unknown)));
        }

        let mut values = [0i8; DIMENSION_COUNT];
        for (slot, domain) in values.iter_mut().zip(DOMAINS.iter()) {
            let value = *map
                .get(domain.name)
                .ok_or_else(|| NetworkError::invalid(name, format!("missing dimension '{}'", domain.name)))?;
            if !domain.contains(value) {
                return Err(NetworkError::invalid(
                    name,
                    format!(
                        "{} = {} outside {}..={}",
                        domain.name, value, domain.min, domain.max
                    ),
                ));
            }
            *slot = value as i8;
        }

        Self::from_codes(name, values)
    }

    /// Build from raw codes in canonical order
    pub fn from_codes(name: &str, codes: [i8; DIMENSION_COUNT]) -> Result<Self> {
        for (code, domain) in codes.iter().zip(DOMAINS.iter()) {
            if !domain.contains(*code as i64) {
                return Err(NetworkError::invalid(
                    name,
                    format!("{} = {} outside {}..={}", domain.name, code, domain.min, domain.max),
                ));
            }
        }

        let [sex, orientation, age, religion, socio, race, music, hobby, personality] = codes;
        Ok(Self {
            sex: Sex::from_code(sex).ok_or_else(|| NetworkError::invalid(name, "bad sex code"))?,
            orientation: Orientation::from_code(orientation)
                .ok_or_else(|| NetworkError::invalid(name, "bad orientation code"))?,
            age,
            religion,
            socio,
            race,
            music,
            hobby,
            personality,
        })
    }

    /// Draw every dimension uniformly from its domain, keeping the given sex
    pub fn random<R: Rng + ?Sized>(rng: &mut R, sex: Sex) -> Self {
        let mut draw = |index: usize| {
            let domain = DOMAINS[index];
            rng.gen_range(domain.min..=domain.max)
        };

        let orientation = draw(1);
        Self {
            sex,
            orientation: Orientation::from_code(orientation).unwrap_or(Orientation::Bisexual),
            age: draw(2),
            religion: draw(3),
            socio: draw(4),
            race: draw(5),
            music: draw(6),
            hobby: draw(7),
            personality: draw(8),
        }
    }

    /// Integer codes in canonical order
    pub fn codes(&self) -> [i8; DIMENSION_COUNT] {
        [
            self.sex.code(),
            self.orientation.code(),
            self.age,
            self.religion,
            self.socio,
            self.race,
            self.music,
            self.hobby,
            self.personality,
        ]
    }

    /// The attribute vector used for affinity scoring
    pub fn to_vector(&self) -> [f64; DIMENSION_COUNT] {
        self.codes().map(f64::from)
    }

    /// Codes keyed by dimension name
    pub fn to_map(&self) -> BTreeMap<String, i64> {
        DOMAINS
            .iter()
            .zip(self.codes())
            .map(|(domain, code)| (domain.name.to_string(), code as i64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn full_map() -> BTreeMap<String, i64> {
        [
            ("sex", 1),
            ("orientation", 0),
            ("age", 21),
            ("religion", -2),
            ("socio", 1),
            ("race", 0),
            ("music", 4),
            ("hobby", -7),
            ("personality", 2),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_from_map_valid() {
        let attrs = Attributes::from_map("Ana", &full_map()).unwrap();
        assert_eq!(attrs.sex, Sex::Female);
        assert_eq!(attrs.orientation, Orientation::Bisexual);
        assert_eq!(attrs.codes(), [1, 0, 21, -2, 1, 0, 4, -7, 2]);
        assert_eq!(attrs.to_map(), full_map());
    }

    #[test]
    fn test_from_map_missing_dimension() {
        let mut map = full_map();
        map.remove("hobby");
        let err = Attributes::from_map("Ana", &map).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidAttributes { ref reason, .. } if reason.contains("hobby")));
    }

    #[test]
    fn test_from_map_unknown_dimension() {
        let mut map = full_map();
        map.insert("height".to_string(), 3);
        assert!(matches!(
            Attributes::from_map("Ana", &map),
            Err(NetworkError::InvalidAttributes { .. })
        ));
    }

    #[test]
    fn test_from_map_out_of_range() {
        let mut map = full_map();
        map.insert("age".to_string(), 30);
        assert!(Attributes::from_map("Ana", &map).is_err());

        let mut map = full_map();
        map.insert("orientation".to_string(), 2);
        assert!(Attributes::from_map("Ana", &map).is_err());
    }

    #[test]
    fn test_random_stays_in_domain() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let attrs = Attributes::random(&mut rng, Sex::Male);
            assert_eq!(attrs.sex, Sex::Male);
            for (code, domain) in attrs.codes().iter().zip(DOMAINS.iter()) {
                assert!(domain.contains(*code as i64), "{} = {}", domain.name, code);
            }
        }
    }

    #[test]
    fn test_serde_uses_codes() {
        let attrs = Attributes::from_map("Ana", &full_map()).unwrap();
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["sex"], 1);
        assert_eq!(json["orientation"], 0);
        let back: Attributes = serde_json::from_value(json).unwrap();
        assert_eq!(back, attrs);
    }
}
