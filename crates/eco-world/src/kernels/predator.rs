//! Predator update rule.

use super::{apply_mobile, first_neighbor_of_kind, Action, Kernel};
use crate::claims::ClaimTable;
use crate::grid::Grid;
use eco_core::{Kind, Position, SpeciesConfig};
use rand_chacha::ChaCha8Rng;

/// Predators hunt adjacent prey, reproduce when well fed, and otherwise
/// wander. Branches are strictly prioritized: death, feed, reproduce,
/// move, idle; the first satisfied branch wins.
pub struct PredatorKernel {
    cfg: SpeciesConfig,
}

impl PredatorKernel {
    pub fn new(cfg: SpeciesConfig) -> Self {
        Self { cfg }
    }
}

impl Kernel for PredatorKernel {
    fn species(&self) -> Kind {
        Kind::Predator
    }

    fn decide(&self, grid: &Grid, origin: Position, _rng: &mut ChaCha8Rng) -> Action {
        let vitals = match grid.get(origin).vitals() {
            Some(v) => v,
            None => return Action::Idle,
        };

        if vitals.energy <= 0
            || vitals.hunger_ticks >= self.cfg.hunger_limit
            || vitals.age >= self.cfg.age_limit
        {
            return Action::Die;
        }

        if let Some(dest) = first_neighbor_of_kind(grid, origin, Kind::Prey) {
            return Action::Feed { dest };
        }

        if vitals.energy >= self.cfg.repro_threshold {
            if let Some(dest) = first_neighbor_of_kind(grid, origin, Kind::Empty) {
                return Action::Reproduce { dest };
            }
        }

        if let Some(dest) = first_neighbor_of_kind(grid, origin, Kind::Empty) {
            return Action::Move { dest };
        }

        Action::Idle
    }

    fn apply(&self, grid: &Grid, origin: Position, action: &Action, claims: &ClaimTable) {
        apply_mobile(Kind::Predator, &self.cfg, grid, origin, action, claims);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::{Cell, Vitals};
    use rand::SeedableRng;

    fn kernel() -> PredatorKernel {
        PredatorKernel::new(SpeciesConfig::predator())
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn predator(energy: i32, hunger_ticks: u32, age: u32) -> Cell {
        Cell::Predator(Vitals {
            energy,
            hunger_ticks,
            age,
        })
    }

    #[test]
    fn test_death_beats_everything() {
        let mut grid = Grid::new(5);
        let origin = Position::new(2, 2);
        grid.place(origin, predator(0, 0, 0));
        grid.place(Position::new(2, 3), Cell::Prey(Vitals::newborn(2)));

        assert_eq!(kernel().decide(&grid, origin, &mut rng()), Action::Die);
    }

    #[test]
    fn test_death_by_hunger_and_age() {
        let mut grid = Grid::new(5);
        let origin = Position::new(2, 2);

        grid.place(origin, predator(5, 3, 0));
        assert_eq!(kernel().decide(&grid, origin, &mut rng()), Action::Die);

        grid.place(origin, predator(5, 0, 10));
        assert_eq!(kernel().decide(&grid, origin, &mut rng()), Action::Die);
    }

    #[test]
    fn test_feed_takes_first_prey_in_scan_order() {
        let mut grid = Grid::new(5);
        let origin = Position::new(2, 2);
        grid.place(origin, predator(5, 0, 0));
        // West comes before east in the scan order.
        grid.place(Position::new(2, 1), Cell::Prey(Vitals::newborn(2)));
        grid.place(Position::new(2, 3), Cell::Prey(Vitals::newborn(2)));

        assert_eq!(
            kernel().decide(&grid, origin, &mut rng()),
            Action::Feed {
                dest: Position::new(2, 1)
            }
        );
    }

    #[test]
    fn test_feed_beats_reproduce() {
        let mut grid = Grid::new(5);
        let origin = Position::new(2, 2);
        grid.place(origin, predator(9, 0, 0));
        grid.place(Position::new(2, 3), Cell::Prey(Vitals::newborn(2)));

        // Plenty of energy to reproduce, but an adjacent prey wins.
        assert!(matches!(
            kernel().decide(&grid, origin, &mut rng()),
            Action::Feed { .. }
        ));
    }

    #[test]
    fn test_reproduce_requires_threshold() {
        let mut grid = Grid::new(5);
        let origin = Position::new(2, 2);

        grid.place(origin, predator(3, 0, 0));
        assert_eq!(
            kernel().decide(&grid, origin, &mut rng()),
            Action::Reproduce {
                dest: Position::new(1, 2)
            }
        );

        grid.place(origin, predator(2, 0, 0));
        assert_eq!(
            kernel().decide(&grid, origin, &mut rng()),
            Action::Move {
                dest: Position::new(1, 2)
            }
        );
    }

    #[test]
    fn test_idle_when_boxed_in() {
        let mut grid = Grid::new(3);
        let origin = Position::new(1, 1);
        grid.place(origin, predator(2, 0, 0));
        for pos in [
            Position::new(0, 1),
            Position::new(2, 1),
            Position::new(1, 0),
            Position::new(1, 2),
        ] {
            grid.place(pos, Cell::Producer);
        }

        assert_eq!(kernel().decide(&grid, origin, &mut rng()), Action::Idle);
    }
}
