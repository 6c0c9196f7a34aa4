//! Attribute similarity as an angle between attribute vectors.
//!
//! The angle is bucketed into quartiles of `[0, π]`, and each relationship
//! procedure maps the bucket to its own probability adjustment.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::error::{NetworkError, Result};
use crate::person::Attributes;

/// Angle in radians between two attribute vectors, always in `[0, π]`
pub fn angle(a: &Attributes, b: &Attributes) -> Result<f64> {
    angle_between(&a.to_vector(), &b.to_vector())
}

/// Angle between two equal-length vectors
pub fn angle_between(a: &[f64], b: &[f64]) -> Result<f64> {
    debug_assert_eq!(a.len(), b.len());

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_sq_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_sq_b: f64 = b.iter().map(|x| x * x).sum();

    if norm_sq_a == 0.0 || norm_sq_b == 0.0 {
        return Err(NetworkError::DegenerateVector);
    }

    // One sqrt of the product keeps identical integer vectors at exactly 1.0
    let ratio = dot / (norm_sq_a * norm_sq_b).sqrt();
    Ok(ratio.clamp(-1.0, 1.0).acos())
}

/// One of four angle ranges: `(0, π/4]`, `(π/4, π/2]`, `(π/2, 3π/4]`, `(3π/4, π]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quartile {
    First,
    Second,
    Third,
    Fourth,
}

impl Quartile {
    /// Bucket of an angle. Exactly zero belongs to no bucket.
    pub fn of(angle: f64) -> Option<Self> {
        if angle <= 0.0 {
            None
        } else if angle <= FRAC_PI_4 {
            Some(Quartile::First)
        } else if angle <= FRAC_PI_2 {
            Some(Quartile::Second)
        } else if angle <= 3.0 * FRAC_PI_4 {
            Some(Quartile::Third)
        } else {
            debug_assert!(angle <= PI + f64::EPSILON);
            Some(Quartile::Fourth)
        }
    }

    fn index(self) -> usize {
        match self {
            Quartile::First => 0,
            Quartile::Second => 1,
            Quartile::Third => 2,
            Quartile::Fourth => 3,
        }
    }
}

/// Probability adjustment per quartile, from most to least similar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PenaltyTable(pub [f64; 4]);

impl PenaltyTable {
    pub const FRIENDSHIP: PenaltyTable = PenaltyTable([0.3, 0.6, 0.8, 0.9]);
    pub const ROMANCE: PenaltyTable = PenaltyTable([0.3, 0.4, 0.5, 0.6]);
    pub const BREAKUP: PenaltyTable = PenaltyTable([0.9, 0.7, 0.5, 0.3]);

    pub fn get(&self, quartile: Quartile) -> f64 {
        self.0[quartile.index()]
    }

    /// Subtracted from the chance of forming a tie. Identical vectors pay nothing.
    pub fn bonding_penalty(&self, angle: f64) -> f64 {
        Quartile::of(angle).map_or(0.0, |q| self.get(q))
    }

    /// Subtracted from the chance of a breakup. Identical vectors count as the closest quartile.
    pub fn breakup_bonus(&self, angle: f64) -> f64 {
        self.get(Quartile::of(angle).unwrap_or(Quartile::First))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{Orientation, Sex, DIMENSION_COUNT};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_identical_vectors_have_zero_angle() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let a = Attributes::random(&mut rng, Sex::Female);
            assert_eq!(angle(&a, &a).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_angle_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let a = Attributes::random(&mut rng, Sex::Male);
            let b = Attributes::random(&mut rng, Sex::Female);
            let theta = angle(&a, &b).unwrap();
            assert!((0.0..=PI).contains(&theta));
            assert_eq!(theta, angle(&b, &a).unwrap());
        }
    }

    #[test]
    fn test_known_angles() {
        let right = angle_between(&[1.0, 0.0], &[0.0, 3.0]).unwrap();
        assert!((right - FRAC_PI_2).abs() < 1e-12);

        let opposite = angle_between(&[2.0, -1.0], &[-4.0, 2.0]).unwrap();
        assert!((opposite - PI).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_is_degenerate() {
        let zero = [0.0; DIMENSION_COUNT];
        let one = [1.0; DIMENSION_COUNT];
        assert_eq!(angle_between(&zero, &one), Err(NetworkError::DegenerateVector));
        assert_eq!(angle_between(&one, &zero), Err(NetworkError::DegenerateVector));
    }

    #[test]
    fn test_degenerate_attributes() {
        // Out of the age domain, but constructible directly
        let blank = Attributes {
            sex: Sex::Male,
            orientation: Orientation::Bisexual,
            age: 0,
            religion: 0,
            socio: 0,
            race: 0,
            music: 0,
            hobby: 0,
            personality: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let other = Attributes::random(&mut rng, Sex::Female);
        assert!(matches!(angle(&blank, &other), Err(NetworkError::DegenerateVector)));
    }

    #[test]
    fn test_quartile_boundaries() {
        assert_eq!(Quartile::of(0.0), None);
        assert_eq!(Quartile::of(1e-9), Some(Quartile::First));
        assert_eq!(Quartile::of(FRAC_PI_4), Some(Quartile::First));
        assert_eq!(Quartile::of(FRAC_PI_4 + 1e-9), Some(Quartile::Second));
        assert_eq!(Quartile::of(FRAC_PI_2), Some(Quartile::Second));
        assert_eq!(Quartile::of(3.0 * FRAC_PI_4), Some(Quartile::Third));
        assert_eq!(Quartile::of(PI), Some(Quartile::Fourth));
    }

    #[test]
    fn test_penalties_monotonic() {
        let angles = [0.1, 1.0, 2.0, 3.0];
        for pair in angles.windows(2) {
            assert!(PenaltyTable::FRIENDSHIP.bonding_penalty(pair[0]) < PenaltyTable::FRIENDSHIP.bonding_penalty(pair[1]));
            assert!(PenaltyTable::ROMANCE.bonding_penalty(pair[0]) < PenaltyTable::ROMANCE.bonding_penalty(pair[1]));
            assert!(PenaltyTable::BREAKUP.breakup_bonus(pair[0]) > PenaltyTable::BREAKUP.breakup_bonus(pair[1]));
        }
    }

    #[test]
    fn test_zero_angle_handling() {
        assert_eq!(PenaltyTable::ROMANCE.bonding_penalty(0.0), 0.0);
        assert_eq!(PenaltyTable::BREAKUP.breakup_bonus(0.0), 0.9);
    }
}
