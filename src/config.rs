use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::affinity::PenaltyTable;
use crate::population::PersonRecord;

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub meta: MetaConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    pub simulation: SimulationParams,
    #[serde(default)]
    pub romance: RomanceParams,
    #[serde(default)]
    pub friendship: FriendshipParams,
    #[serde(default)]
    pub breakup: BreakupParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Run title used in the chronicle
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of people to generate when no roster is given
    pub count: usize,
    /// Explicit roster; overrides `count` when non-empty
    pub people: Vec<PersonRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of generations to run
    pub generations: usize,
    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
    /// Generations between snapshots handed to observers (0 = never)
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,
    /// Run one friendship pass before the first generation
    #[serde(default)]
    pub initial_friendships: bool,
}

/// Romantic formation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RomanceParams {
    /// Singles drawn as initiators
    pub sample_pool: usize,
    /// Singles each initiator gets to meet
    pub candidate_pool: usize,
    /// Subtracted when the two are already friends
    pub friend_penalty: f64,
    /// Subtracted when the two are exes
    pub ex_penalty: f64,
    /// Subtracted per ex whose current partner once dated the candidate
    pub cycle_penalty: f64,
    pub penalties: PenaltyTable,
}

/// Friendship formation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendshipParams {
    /// People drawn as initiators
    pub sample_size: usize,
    /// People each initiator gets to meet
    pub candidate_pool: usize,
    /// Subtracted when the candidate is an ex
    pub ex_penalty: f64,
    pub penalties: PenaltyTable,
}

/// Breakup parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakupParams {
    /// Breakup chance before the affinity bonus
    pub base_probability: f64,
    /// Chance that a breaking couple who were friends stop being friends
    pub friendship_loss: f64,
    pub penalties: PenaltyTable,
}

fn default_checkpoint_interval() -> usize {
    10
}

impl SimulationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_with(people: usize, generations: usize, seed: Option<u64>) -> Self {
        Self {
            meta: MetaConfig {
                name: "Untitled Network".to_string(),
            },
            population: PopulationConfig {
                count: people,
                people: Vec::new(),
            },
            simulation: SimulationParams {
                generations,
                seed,
                checkpoint_interval: default_checkpoint_interval(),
                initial_friendships: true,
            },
            romance: RomanceParams::default(),
            friendship: FriendshipParams {
                sample_size: 20,
                ..FriendshipParams::default()
            },
            breakup: BreakupParams::default(),
        }
    }

    /// Number of people the run will have
    pub fn population_size(&self) -> usize {
        if self.population.people.is_empty() {
            self.population.count
        } else {
            self.population.people.len()
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count: 100,
            people: Vec::new(),
        }
    }
}

impl Default for RomanceParams {
    fn default() -> Self {
        Self {
            sample_pool: 20,
            candidate_pool: 10,
            friend_penalty: 0.5,
            ex_penalty: 0.7,
            cycle_penalty: 0.6,
            penalties: PenaltyTable::ROMANCE,
        }
    }
}

impl Default for FriendshipParams {
    fn default() -> Self {
        Self {
            sample_size: 70,
            candidate_pool: 8,
            ex_penalty: 0.9,
            penalties: PenaltyTable::FRIENDSHIP,
        }
    }
}

impl Default for BreakupParams {
    fn default() -> Self {
        Self {
            base_probability: 0.95,
            friendship_loss: 0.9,
            penalties: PenaltyTable::BREAKUP,
        }
    }
}
