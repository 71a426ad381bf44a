//! Double-buffered 2D grid for the ecosystem.
//!
//! The grid holds two buffers: the committed buffer, which every kernel
//! reads during a pass, and the pending buffer, which kernels write through
//! the owned [`LockTable`]. `snapshot()` and `commit()` are the sequential
//! brackets around the parallel region of a pass.

use crate::locks::LockTable;
use eco_core::{Cell, Direction, Error, Kind, Position, PopulationConfig, Result, Vitals};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Square grid with a committed buffer and a lock-guarded pending buffer.
pub struct Grid {
    dim: usize,
    committed: Vec<Cell>,
    locks: LockTable,
}

impl Grid {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            committed: vec![Cell::Empty; dim * dim],
            locks: LockTable::new(dim),
        }
    }

    /// Clear the grid back to all-empty at the given dimension.
    ///
    /// Rebuilds the lock table alongside the buffers; their lifetimes are
    /// tied together.
    pub fn reset(&mut self, dim: usize) {
        self.dim = dim;
        self.committed = vec![Cell::Empty; dim * dim];
        self.locks = LockTable::new(dim);
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Committed cell at `pos`. Out-of-range coordinates are a logic error
    /// and panic; neighbor enumeration never produces them.
    pub fn get(&self, pos: Position) -> Cell {
        self.committed[pos.index(self.dim)]
    }

    pub fn kind_at(&self, pos: Position) -> Kind {
        self.get(pos).kind()
    }

    /// Write a committed cell directly. Seeding and tests only; kernels go
    /// through the lock table.
    pub fn place(&mut self, pos: Position, cell: Cell) {
        let index = pos.index(self.dim);
        self.committed[index] = cell;
    }

    /// In-bounds orthogonal neighbors of `pos` in fixed N/S/W/E order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        let dim = self.dim;
        Direction::scan_order()
            .into_iter()
            .map(move |dir| pos.step(dir))
            .filter(move |p| p.in_bounds(dim))
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// Copy committed into pending. Sequential; runs once before the
    /// parallel region of a pass opens.
    pub fn snapshot(&mut self) {
        let Self {
            committed, locks, ..
        } = self;
        for (slot, cell) in locks.cells_mut().zip(committed.iter()) {
            *slot = *cell;
        }
    }

    /// Copy pending into committed. Sequential; runs once after the pass
    /// barrier, making the pass's writes visible to the next snapshot.
    pub fn commit(&mut self) {
        let Self {
            committed, locks, ..
        } = self;
        for (cell, slot) in committed.iter_mut().zip(locks.cells_mut()) {
            *cell = *slot;
        }
    }

    /// Iterate the committed buffer. The read-only reporting surface; must
    /// not run concurrently with a pass.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.committed
            .iter()
            .enumerate()
            .map(|(i, cell)| (Position::from_index(i, self.dim), cell))
    }

    /// Seed the grid with the requested populations at uniformly random
    /// empty positions, using the default newborn energy of 2. Counts are
    /// capped at the grid capacity so placement always terminates.
    pub fn populate(&mut self, population: &PopulationConfig, rng: &mut ChaCha8Rng) {
        let newborn = Vitals::newborn(2);
        self.populate_with(population, newborn, newborn, rng);
    }

    /// Seed with explicit per-species starting vitals.
    pub fn populate_with(
        &mut self,
        population: &PopulationConfig,
        prey_vitals: Vitals,
        predator_vitals: Vitals,
        rng: &mut ChaCha8Rng,
    ) {
        let capacity = self.len();
        if population.total() > capacity {
            warn!(
                requested = population.total(),
                capacity, "population request exceeds grid capacity, clamping"
            );
        }

        let mut remaining = capacity;
        let mut take = |count: usize| {
            let granted = count.min(remaining);
            remaining -= granted;
            granted
        };
        let producers = take(population.producers);
        let prey = take(population.prey);
        let predators = take(population.predators);

        self.scatter(Cell::Producer, producers, rng);
        self.scatter(Cell::Prey(prey_vitals), prey, rng);
        self.scatter(Cell::Predator(predator_vitals), predators, rng);

        debug!(producers, prey, predators, "grid seeded");
    }

    fn scatter(&mut self, cell: Cell, count: usize, rng: &mut ChaCha8Rng) {
        let mut placed = 0;
        while placed < count {
            let pos = Position::new(
                rng.gen_range(0..self.dim as i32),
                rng.gen_range(0..self.dim as i32),
            );
            if self.get(pos).is_empty() {
                self.place(pos, cell);
                placed += 1;
            }
        }
    }

    /// Per-kind population counts over the committed buffer.
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for cell in &self.committed {
            match cell.kind() {
                Kind::Empty => census.empty += 1,
                Kind::Producer => census.producers += 1,
                Kind::Prey => census.prey += 1,
                Kind::Predator => census.predators += 1,
            }
        }
        census
    }

    /// Serializable copy of the committed state.
    pub fn state(&self) -> GridState {
        GridState {
            dim: self.dim,
            cells: self.committed.clone(),
        }
    }

    /// Rebuild a grid from exported state.
    pub fn from_state(state: GridState) -> Result<Self> {
        if state.cells.len() != state.dim * state.dim {
            return Err(Error::InvalidState(format!(
                "grid state holds {} cells for dimension {}",
                state.cells.len(),
                state.dim
            )));
        }
        Ok(Self {
            dim: state.dim,
            committed: state.cells,
            locks: LockTable::new(state.dim),
        })
    }
}

/// Population counts per cell kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub producers: usize,
    pub prey: usize,
    pub predators: usize,
    pub empty: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.producers + self.prey + self.predators + self.empty
    }
}

/// Committed grid contents in exportable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    pub dim: usize,
    pub cells: Vec<Cell>,
}
