//! Producer update rule.

use super::{Action, Kernel};
use crate::claims::ClaimTable;
use crate::grid::Grid;
use eco_core::{Cell, Kind, Position};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Producers colonize each empty neighbor independently with a fixed
/// probability, and die when they have no empty neighbor left to expand
/// into.
pub struct ProducerKernel {
    growth_chance: f32,
}

impl ProducerKernel {
    pub fn new(growth_chance: f32) -> Self {
        Self { growth_chance }
    }
}

impl Kernel for ProducerKernel {
    fn species(&self) -> Kind {
        Kind::Producer
    }

    fn decide(&self, grid: &Grid, origin: Position, rng: &mut ChaCha8Rng) -> Action {
        let empties: Vec<Position> = grid
            .neighbors(origin)
            .filter(|&p| grid.kind_at(p) == Kind::Empty)
            .collect();
        if empties.is_empty() {
            return Action::Die;
        }

        // One independent roll per empty neighbor; several may succeed in
        // the same tick.
        let targets = empties
            .into_iter()
            .filter(|_| rng.gen::<f32>() < self.growth_chance)
            .collect();
        Action::Spread { targets }
    }

    fn apply(&self, grid: &Grid, origin: Position, action: &Action, claims: &ClaimTable) {
        let dim = grid.dim();
        let origin_token = origin.index(dim) as u32;
        match action {
            Action::Die => {
                *grid.locks().acquire_one(origin) = Cell::Empty;
            }
            Action::Spread { targets } => {
                for dest in targets {
                    if !claims.won(dest.index(dim), origin_token) {
                        continue;
                    }
                    // The origin's own pending state stays untouched; the
                    // pair is held so the two-cell write follows the same
                    // protocol as every other kernel.
                    let mut pair = grid.locks().acquire_pair(*dest, origin);
                    *pair.a_mut() = Cell::Producer;
                }
            }
            _ => debug_assert!(false, "producers only die or spread"),
        }
    }
}
