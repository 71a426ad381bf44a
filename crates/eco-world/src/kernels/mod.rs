//! Species behavior kernels.
//!
//! Each kernel splits its per-cell rule into a pure decision step and an
//! apply step. `decide` evaluates the branch priority list against the
//! committed snapshot and returns the first applicable [`Action`]; it never
//! touches shared state, so the rule tables are testable without the
//! parallel machinery. `apply` performs the pending-buffer writes for a
//! decided action under the grid's lock table, honoring the claim table's
//! verdict for contested destinations.

pub mod predator;
pub mod prey;
pub mod producer;

pub use predator::PredatorKernel;
pub use prey::PreyKernel;
pub use producer::ProducerKernel;

use crate::claims::ClaimTable;
use crate::grid::Grid;
use eco_core::{Cell, Kind, Position, SpeciesConfig, Vitals};
use rand_chacha::ChaCha8Rng;

/// The outcome a kernel picked for one organism, to be applied to the
/// pending buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The organism is removed.
    Die,
    /// Producer colonization of zero or more empty neighbors.
    Spread { targets: Vec<Position> },
    /// Move onto a neighbor holding food, consuming it.
    Feed { dest: Position },
    /// Spawn a newborn at an empty neighbor; the parent stays put.
    Reproduce { dest: Position },
    /// Relocate to an empty neighbor.
    Move { dest: Position },
    /// Stay in place and age.
    Idle,
}

impl Action {
    /// Destinations this action wants to write besides its own origin.
    pub fn claim_targets(&self) -> &[Position] {
        match self {
            Action::Spread { targets } => targets,
            Action::Feed { dest } | Action::Reproduce { dest } | Action::Move { dest } => {
                std::slice::from_ref(dest)
            }
            Action::Die | Action::Idle => &[],
        }
    }
}

/// One species' update rule: which cells it sweeps, what it decides for
/// each of them, and how a decision lands in the pending buffer.
pub trait Kernel: Sync {
    /// Cell kind this kernel sweeps.
    fn species(&self) -> Kind;

    /// Pick the action for the organism at `origin`, reading only the
    /// committed snapshot.
    fn decide(&self, grid: &Grid, origin: Position, rng: &mut ChaCha8Rng) -> Action;

    /// Write the decided action into the pending buffer through the lock
    /// table, deferring to `claims` on contested destinations.
    fn apply(&self, grid: &Grid, origin: Position, action: &Action, claims: &ClaimTable);
}

/// First in-bounds neighbor of `origin` holding `kind`, in scan order.
pub(crate) fn first_neighbor_of_kind(
    grid: &Grid,
    origin: Position,
    kind: Kind,
) -> Option<Position> {
    grid.neighbors(origin).find(|&p| grid.kind_at(p) == kind)
}

fn bump(vitals: &mut Vitals) {
    vitals.hunger_ticks += 1;
    vitals.age += 1;
}

/// End-of-turn metabolism at the decrement-target cell.
fn metabolize(cell: &mut Cell, species: Kind) {
    if cell.kind() == species {
        if let Some(vitals) = cell.vitals_mut() {
            vitals.energy -= 1;
        }
    }
}

/// Idle turn at the origin: hunger and age advance, then metabolism.
fn idle_in_place(grid: &Grid, origin: Position, species: Kind) {
    let mut guard = grid.locks().acquire_one(origin);
    if let Some(vitals) = guard.vitals_mut() {
        bump(vitals);
    }
    metabolize(&mut guard, species);
}

/// Shared apply logic for the two mobile species.
///
/// A lost claim on any destination demotes the turn to the idle branch;
/// the organism keeps its cell and pays the usual upkeep.
pub(crate) fn apply_mobile(
    species: Kind,
    cfg: &SpeciesConfig,
    grid: &Grid,
    origin: Position,
    action: &Action,
    claims: &ClaimTable,
) {
    let dim = grid.dim();
    let origin_token = origin.index(dim) as u32;
    match action {
        Action::Die => {
            *grid.locks().acquire_one(origin) = Cell::Empty;
        }
        Action::Feed { dest } => {
            if claims.won(dest.index(dim), origin_token) {
                let old = match grid.get(origin).vitals() {
                    Some(v) => v,
                    None => return,
                };
                let fed = Vitals {
                    energy: old.energy + cfg.feed_gain,
                    hunger_ticks: 0,
                    age: old.age + 1,
                };
                let mut pair = grid.locks().acquire_pair(*dest, origin);
                *pair.a_mut() = Cell::organism(species, fed);
                *pair.b_mut() = Cell::Empty;
                metabolize(pair.a_mut(), species);
            } else {
                idle_in_place(grid, origin, species);
            }
        }
        Action::Move { dest } => {
            if claims.won(dest.index(dim), origin_token) {
                let old = match grid.get(origin).vitals() {
                    Some(v) => v,
                    None => return,
                };
                let mut moved = old;
                bump(&mut moved);
                let mut pair = grid.locks().acquire_pair(*dest, origin);
                *pair.a_mut() = Cell::organism(species, moved);
                *pair.b_mut() = Cell::Empty;
                metabolize(pair.a_mut(), species);
            } else {
                idle_in_place(grid, origin, species);
            }
        }
        Action::Reproduce { dest } => {
            if claims.won(dest.index(dim), origin_token) {
                let newborn = Vitals::newborn(cfg.newborn_energy);
                let mut pair = grid.locks().acquire_pair(*dest, origin);
                *pair.a_mut() = Cell::organism(species, newborn);
                if let Some(parent) = pair.b_mut().vitals_mut() {
                    parent.energy -= cfg.repro_cost;
                    if species == Kind::Prey {
                        // Prey parents age two ticks when reproducing;
                        // predator parents do not age at all.
                        parent.age += 2;
                    }
                }
                metabolize(pair.b_mut(), species);
            } else {
                idle_in_place(grid, origin, species);
            }
        }
        Action::Idle => idle_in_place(grid, origin, species),
        Action::Spread { .. } => {
            debug_assert!(false, "mobile species never spread");
        }
    }
}
