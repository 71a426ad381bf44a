//! Prey update rule.

use super::{apply_mobile, first_neighbor_of_kind, Action, Kernel};
use crate::claims::ClaimTable;
use crate::grid::Grid;
use eco_core::{Kind, Position, SpeciesConfig};
use rand_chacha::ChaCha8Rng;

/// Prey flee adjacent predators toward cells with no predator in reach,
/// graze on producers, reproduce when fed, and otherwise forage toward
/// food. Branch priority: death, flee, feed, reproduce, forage, idle.
pub struct PreyKernel {
    cfg: SpeciesConfig,
}

impl PreyKernel {
    pub fn new(cfg: SpeciesConfig) -> Self {
        Self { cfg }
    }

    /// An empty cell is safe if none of its own neighbors holds a predator.
    fn is_safe(grid: &Grid, pos: Position) -> bool {
        grid.neighbors(pos)
            .all(|n| grid.kind_at(n) != Kind::Predator)
    }
}

impl Kernel for PreyKernel {
    fn species(&self) -> Kind {
        Kind::Prey
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

        let threatened = grid
            .neighbors(origin)
            .any(|n| grid.kind_at(n) == Kind::Predator);
        if threatened {
            let safe_cell = grid
                .neighbors(origin)
                .find(|&p| grid.kind_at(p) == Kind::Empty && Self::is_safe(grid, p));
            if let Some(dest) = safe_cell {
                return Action::Move { dest };
            }
            // No safe escape; fall through to the remaining branches.
        }

        if let Some(dest) = first_neighbor_of_kind(grid, origin, Kind::Producer) {
            return Action::Feed { dest };
        }

        if vitals.energy >= self.cfg.repro_threshold {
            if let Some(dest) = first_neighbor_of_kind(grid, origin, Kind::Empty) {
                return Action::Reproduce { dest };
            }
        }

        // Forage: prefer an empty cell adjacent to a producer, else any
        // empty cell, in scan order.
        let empties: Vec<Position> = grid
            .neighbors(origin)
            .filter(|&p| grid.kind_at(p) == Kind::Empty)
            .collect();
        let toward_food = empties.iter().copied().find(|&p| {
            grid.neighbors(p)
                .any(|n| grid.kind_at(n) == Kind::Producer)
        });
        if let Some(dest) = toward_food.or_else(|| empties.first().copied()) {
            return Action::Move { dest };
        }

        Action::Idle
    }

    fn apply(&self, grid: &Grid, origin: Position, action: &Action, claims: &ClaimTable) {
        apply_mobile(Kind::Prey, &self.cfg, grid, origin, action, claims);
    }
}
