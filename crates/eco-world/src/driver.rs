//! Tick driver: sequences the species passes over the grid.
//!
//! One tick is three passes, always in producer, predator, prey order.
//! Each pass brackets a data-parallel sweep with the sequential
//! `snapshot`/`commit` pair, so every decision in a pass reads the same
//! immutable snapshot and the pass's writes become visible only after its
//! barrier. Within the sweep, a claim phase files destination claims, a
//! second parallel phase applies the winning actions through the lock
//! table.

use crate::claims::ClaimTable;
use crate::grid::Grid;
use crate::kernels::{Action, Kernel, PredatorKernel, PreyKernel, ProducerKernel};
use eco_core::{Position, SimConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Producer,
    Predator,
    Prey,
}

impl Pass {
    fn label(self) -> &'static str {
        match self {
            Pass::Producer => "producer",
            Pass::Predator => "predator",
            Pass::Prey => "prey",
        }
    }

    fn salt(self) -> u64 {
        match self {
            Pass::Producer => 0,
            Pass::Predator => 1,
            Pass::Prey => 2,
        }
    }
}

/// Owns the three kernels and the per-pass claim table, and advances a
/// grid one tick at a time.
pub struct TickDriver {
    producer: ProducerKernel,
    predator: PredatorKernel,
    prey: PreyKernel,
    claims: ClaimTable,
    seed: u64,
    tick: u64,
}

impl TickDriver {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            producer: ProducerKernel::new(config.world.producer_growth_chance),
            predator: PredatorKernel::new(config.predator.clone()),
            prey: PreyKernel::new(config.prey.clone()),
            claims: ClaimTable::new(config.world.dim * config.world.dim),
            seed: config.seed,
            tick: 0,
        }
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance the grid by one full tick. Passes never overlap; each one's
    /// commit is visible before the next snapshot is taken.
    pub fn advance(&mut self, grid: &mut Grid) {
        self.run_pass(grid, Pass::Producer);
        self.run_pass(grid, Pass::Predator);
        self.run_pass(grid, Pass::Prey);
        self.tick += 1;
    }

    pub(crate) fn run_pass(&mut self, grid: &mut Grid, pass: Pass) {
        if self.claims.len() != grid.len() {
            self.claims = ClaimTable::new(grid.len());
        }
        grid.snapshot();
        self.claims.reset();

        let kernel: &dyn Kernel = match pass {
            Pass::Producer => &self.producer,
            Pass::Predator => &self.predator,
            Pass::Prey => &self.prey,
        };
        let claims = &self.claims;
        let seed = self.seed;
        let tick = self.tick;
        let dim = grid.dim();
        let grid_ref: &Grid = grid;

        // Claim phase: decide every organism's action against the
        // committed snapshot and file its destination claims.
        let actions: Vec<Vec<(Position, Action)>> = (0..dim)
            .into_par_iter()
            .map(|row| {
                let mut decided = Vec::new();
                for col in 0..dim {
                    let origin = Position::new(row as i32, col as i32);
                    if grid_ref.kind_at(origin) != kernel.species() {
                        continue;
                    }
                    let index = origin.index(dim);
                    let mut rng = cell_rng(seed, tick, pass.salt(), index as u64);
                    let action = kernel.decide(grid_ref, origin, &mut rng);
                    for target in action.claim_targets() {
                        claims.file(target.index(dim), index as u32);
                    }
                    decided.push((origin, action));
                }
                decided
            })
            .collect();

        // Apply phase: claim winners write through the lock table, losers
        // fall back to their idle branch.
        actions.par_iter().for_each(|row| {
            for (origin, action) in row {
                kernel.apply(grid_ref, *origin, action, claims);
            }
        });

        grid.commit();
        trace!(tick, pass = pass.label(), "pass committed");
    }
}

/// Deterministic per-cell RNG stream.
///
/// Mixes the base seed with the tick, pass, and cell index (splitmix64
/// finalizer) so a sweep draws the same randomness no matter how rayon
/// schedules it.
fn cell_rng(seed: u64, tick: u64, pass_salt: u64, index: u64) -> ChaCha8Rng {
    let mut x = seed
        ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ pass_salt.wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ index.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    ChaCha8Rng::seed_from_u64(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::{Cell, Kind, Vitals};

    fn driver_for(dim: usize) -> TickDriver {
        let mut config = SimConfig::default();
        config.world.dim = dim;
        TickDriver::new(&config)
    }

    fn predator(energy: i32) -> Cell {
        Cell::Predator(Vitals::newborn(energy))
    }

    #[test]
    fn test_predator_feeds_on_adjacent_prey() {
        let mut grid = Grid::new(5);
        grid.place(Position::new(2, 2), predator(5));
        grid.place(Position::new(2, 3), Cell::Prey(Vitals::newborn(2)));

        let mut driver = driver_for(5);
        driver.run_pass(&mut grid, Pass::Predator);

        assert_eq!(
            grid.get(Position::new(2, 3)),
            Cell::Predator(Vitals {
                energy: 6,
                hunger_ticks: 0,
                age: 1,
            })
        );
        assert_eq!(grid.get(Position::new(2, 2)), Cell::Empty);
    }

    #[test]
    fn test_exhausted_predator_dies_in_place() {
        let mut grid = Grid::new(5);
        grid.place(Position::new(2, 2), predator(0));
        let before = grid.state();

        let mut driver = driver_for(5);
        driver.run_pass(&mut grid, Pass::Predator);

        assert_eq!(grid.get(Position::new(2, 2)), Cell::Empty);
        for (pos, cell) in grid.iter() {
            if pos != Position::new(2, 2) {
                assert_eq!(*cell, before.cells[pos.index(5)]);
            }
        }
    }

    #[test]
    fn test_contested_destination_goes_to_lowest_origin() {
        // Two predators with exactly one legal move each, onto the same
        // empty cell between them.
        let mut grid = Grid::new(5);
        grid.place(Position::new(0, 0), predator(2));
        grid.place(Position::new(0, 2), predator(2));
        grid.place(Position::new(1, 0), Cell::Producer);
        grid.place(Position::new(1, 2), Cell::Producer);
        grid.place(Position::new(0, 3), Cell::Producer);

        let mut driver = driver_for(5);
        driver.run_pass(&mut grid, Pass::Predator);

        // (0, 0) has the lower packed index and wins the cell; the loser
        // stays put and idles.
        assert_eq!(
            grid.get(Position::new(0, 1)),
            Cell::Predator(Vitals {
                energy: 1,
                hunger_ticks: 1,
                age: 1,
            })
        );
        assert_eq!(grid.get(Position::new(0, 0)), Cell::Empty);
        assert_eq!(
            grid.get(Position::new(0, 2)),
            Cell::Predator(Vitals {
                energy: 1,
                hunger_ticks: 1,
                age: 1,
            })
        );
        assert_eq!(grid.census().predators, 2);
    }

    #[test]
    fn test_prey_reproduction_costs_energy_and_ages_parent() {
        let mut grid = Grid::new(5);
        grid.place(Position::new(2, 2), Cell::Prey(Vitals::newborn(3)));

        let mut driver = driver_for(5);
        driver.run_pass(&mut grid, Pass::Prey);

        assert_eq!(
            grid.get(Position::new(2, 2)),
            Cell::Prey(Vitals {
                energy: 0,
                hunger_ticks: 0,
                age: 2,
            })
        );
        assert_eq!(
            grid.get(Position::new(1, 2)),
            Cell::Prey(Vitals::newborn(2))
        );
    }

    #[test]
    fn test_predator_reproduction_does_not_age_parent() {
        let mut grid = Grid::new(5);
        grid.place(Position::new(2, 2), predator(4));

        let mut driver = driver_for(5);
        driver.run_pass(&mut grid, Pass::Predator);

        assert_eq!(
            grid.get(Position::new(2, 2)),
            Cell::Predator(Vitals {
                energy: 1,
                hunger_ticks: 0,
                age: 0,
            })
        );
        assert_eq!(grid.get(Position::new(1, 2)), predator(2));
    }

    #[test]
    fn test_boxed_in_producer_is_removed_regardless_of_seed() {
        for seed in [0, 1, 99] {
            let mut config = SimConfig::default();
            config.world.dim = 3;
            config.seed = seed;
            let mut driver = TickDriver::new(&config);

            let mut grid = Grid::new(3);
            for row in 0..3 {
                for col in 0..3 {
                    grid.place(Position::new(row, col), Cell::Producer);
                }
            }
            driver.run_pass(&mut grid, Pass::Producer);
            assert_eq!(grid.census().producers, 0, "seed {seed}");
        }
    }

    #[test]
    fn test_producer_growth_is_reproducible() {
        let run = |seed: u64| {
            let mut config = SimConfig::default();
            config.world.dim = 6;
            config.seed = seed;
            let mut driver = TickDriver::new(&config);
            let mut grid = Grid::new(6);
            grid.place(Position::new(3, 3), Cell::Producer);
            for _ in 0..4 {
                driver.advance(&mut grid);
            }
            grid.state()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_advance_counts_ticks_and_conserves_cells() {
        let mut config = SimConfig::default();
        config.world.dim = 8;
        let mut driver = TickDriver::new(&config);

        let mut grid = Grid::new(8);
        grid.place(Position::new(1, 1), Cell::Producer);
        grid.place(Position::new(4, 4), Cell::Prey(Vitals::newborn(2)));
        grid.place(Position::new(6, 6), predator(2));

        for expected in 1..=5 {
            driver.advance(&mut grid);
            assert_eq!(driver.tick(), expected);
            assert_eq!(grid.census().total(), 64);
        }
    }

    #[test]
    fn test_no_organism_of_other_kinds_changes_during_a_pass() {
        let mut grid = Grid::new(5);
        grid.place(Position::new(0, 0), Cell::Prey(Vitals::newborn(2)));
        grid.place(Position::new(4, 4), Cell::Producer);
        grid.place(Position::new(2, 2), predator(0));

        let mut driver = driver_for(5);
        driver.run_pass(&mut grid, Pass::Predator);

        assert_eq!(grid.kind_at(Position::new(0, 0)), Kind::Prey);
        assert_eq!(grid.kind_at(Position::new(4, 4)), Kind::Producer);
    }
}
