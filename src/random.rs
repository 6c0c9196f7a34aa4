//! The single random source every procedure draws from.
//!
//! Draw order is part of the observable behavior: a procedure samples its
//! initiators first, then per initiator samples candidates and makes one
//! uniform draw per evaluated candidate, in enumeration order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::person::PersonId;

pub trait RandomSource {
    /// `amount` distinct ids from `pool`, in draw order. `amount` must not exceed the pool.
    fn sample(&mut self, pool: &[PersonId], amount: usize) -> Vec<PersonId>;

    /// A uniform value in `[0, 1)`
    fn uniform(&mut self) -> f64;
}

/// Seedable simulation RNG
#[derive(Debug, Clone)]
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// From an optional seed, falling back to entropy
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seed_from_u64(seed),
            None => Self::from_entropy(),
        }
    }

    /// Direct access for population generation
    pub fn inner(&mut self) -> &mut ChaCha8Rng {
        &mut self.0
    }
}

impl RandomSource for SimRng {
    fn sample(&mut self, pool: &[PersonId], amount: usize) -> Vec<PersonId> {
        assert!(amount <= pool.len(), "sample of {} from pool of {}", amount, pool.len());
        pool.choose_multiple(&mut self.0, amount).copied().collect()
    }

    fn uniform(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Replays fixed draws. Samples take the pool prefix, uniforms cycle through a script.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    next: usize,
    pub uniforms_drawn: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty());
        Self {
            draws,
            next: 0,
            uniforms_drawn: 0,
        }
    }

    /// Every draw is zero, so any non-negative probability accepts
    pub fn always_accept() -> Self {
        Self::new(vec![0.0])
    }

    /// Every draw is just below one, so only probability one accepts
    pub fn always_reject() -> Self {
        Self::new(vec![0.999_999])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn sample(&mut self, pool: &[PersonId], amount: usize) -> Vec<PersonId> {
        assert!(amount <= pool.len());
        pool[..amount].to_vec()
    }

    fn uniform(&mut self) -> f64 {
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        self.uniforms_drawn += 1;
        value
    }
}
