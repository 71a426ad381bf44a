//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length of the square grid
    pub dim: usize,
    /// Probability that a producer colonizes each empty neighbor per tick
    pub producer_growth_chance: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dim: 10,
            producer_growth_chance: 0.30,
        }
    }
}

/// Per-species life-cycle thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Death when `hunger_ticks` reaches this value
    pub hunger_limit: u32,
    /// Death when `age` reaches this value
    pub age_limit: u32,
    /// Minimum energy required to reproduce
    pub repro_threshold: i32,
    /// Energy the parent spends on reproduction
    pub repro_cost: i32,
    /// Starting energy for offspring (also used when seeding the grid)
    pub newborn_energy: i32,
    /// Energy gained from one successful feeding
    pub feed_gain: i32,
}

impl SpeciesConfig {
    pub fn predator() -> Self {
        Self {
            hunger_limit: 3,
            age_limit: 10,
            repro_threshold: 3,
            repro_cost: 2,
            newborn_energy: 2,
            feed_gain: 2,
        }
    }

    pub fn prey() -> Self {
        Self {
            feed_gain: 1,
            ..Self::predator()
        }
    }
}

/// Initial population sizes, placed at random empty cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub producers: usize,
    pub prey: usize,
    pub predators: usize,
}

impl PopulationConfig {
    pub fn total(&self) -> usize {
        self.producers + self.prey + self.predators
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            producers: 30,
            prey: 25,
            predators: 5,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Predator life-cycle thresholds
    pub predator: SpeciesConfig,
    /// Prey life-cycle thresholds
    pub prey: SpeciesConfig,
    /// Initial population sizes
    pub population: PopulationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_ticks: 10,
            seed: 0,
            world: WorldConfig::default(),
            predator: SpeciesConfig::predator(),
            prey: SpeciesConfig::prey(),
            population: PopulationConfig::default(),
        }
    }
}

impl SimConfig {
    /// Check the parts of the configuration that cannot be clamped.
    ///
    /// Population sizes are not rejected here; the grid caps them at its
    /// capacity when seeding so placement always terminates.
    pub fn validate(&self) -> Result<()> {
        if self.world.dim == 0 {
            return Err(Error::Validation("grid dimension must be non-zero".into()));
        }
        let chance = self.world.producer_growth_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(Error::Validation(format!(
                "producer growth chance {chance} outside [0, 1]"
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
