//! Top-level simulation facade.
//!
//! Owns the grid and the tick driver, seeds the world from a
//! [`SimConfig`], and exposes the read-only reporting surface (census and
//! committed grid state). Callers that render or print statistics read
//! through here between ticks; `&self` accessors cannot overlap with the
//! `&mut self` stepping methods, so reporting never observes a pass in
//! flight.

use crate::driver::TickDriver;
use crate::grid::{Census, Grid, GridState};
use eco_core::{Result, SimConfig, Vitals};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

pub struct Simulation {
    config: SimConfig,
    grid: Grid,
    driver: TickDriver,
}

impl Simulation {
    /// Validate the configuration, build the grid and lock table, and seed
    /// the initial populations.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut grid = Grid::new(config.world.dim);
        grid.populate_with(
            &config.population,
            Vitals::newborn(config.prey.newborn_energy),
            Vitals::newborn(config.predator.newborn_energy),
            &mut rng,
        );
        let driver = TickDriver::new(&config);

        let census = grid.census();
        info!(
            dim = config.world.dim,
            producers = census.producers,
            prey = census.prey,
            predators = census.predators,
            "simulation seeded"
        );

        Ok(Self {
            config,
            grid,
            driver,
        })
    }

    /// Run for the configured number of ticks.
    #[instrument(skip(self), fields(num_ticks = self.config.num_ticks))]
    pub fn run(&mut self) -> RunSummary {
        for _ in 0..self.config.num_ticks {
            self.step();

            let census = self.grid.census();
            debug!(
                tick = self.driver.tick(),
                producers = census.producers,
                prey = census.prey,
                predators = census.predators,
                "tick complete"
            );
        }

        let summary = RunSummary {
            ticks: self.driver.tick(),
            census: self.grid.census(),
        };
        info!(
            ticks = summary.ticks,
            producers = summary.census.producers,
            prey = summary.census.prey,
            predators = summary.census.predators,
            "run complete"
        );
        summary
    }

    /// Advance exactly one tick.
    pub fn step(&mut self) {
        self.driver.advance(&mut self.grid);
    }

    pub fn tick(&self) -> u64 {
        self.driver.tick()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only committed grid for reporting.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn census(&self) -> Census {
        self.grid.census()
    }

    /// Exportable copy of the committed state.
    pub fn state(&self) -> GridState {
        self.grid.state()
    }
}

/// What a finished run hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub census: Census,
}
