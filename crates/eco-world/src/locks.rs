//! Per-cell lock table guarding the pending buffer.
//!
//! Each slot pairs a `parking_lot::Mutex` with the pending copy of that
//! cell, so the only way to write pending state is through a lock guard.
//! Two-cell transactions go through [`LockTable::acquire_pair`], which
//! always locks the cell with the smaller packed row-major index first.
//!
//! Deadlock-freedom sketch: every pair acquisition takes locks in strictly
//! increasing index order, so the "waits-for" relation between workers only
//! ever points from a held lower index to a wanted higher index. A cycle in
//! that relation would need some edge pointing from a higher index to a
//! lower one, which the canonical order rules out. Single acquisitions
//! cannot form a cycle on their own, and no caller holds a guard across a
//! point that re-enters the table.

use eco_core::{Cell, Position};
use parking_lot::{Mutex, MutexGuard};

/// One mutex per grid cell, owning the pending copy of the cell.
///
/// Created together with the grid and lives exactly as long as it does.
pub struct LockTable {
    dim: usize,
    slots: Vec<Mutex<Cell>>,
}

impl LockTable {
    pub(crate) fn new(dim: usize) -> Self {
        let slots = (0..dim * dim).map(|_| Mutex::new(Cell::Empty)).collect();
        Self { dim, slots }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Lock a single pending cell.
    pub fn acquire_one(&self, pos: Position) -> MutexGuard<'_, Cell> {
        self.slots[pos.index(self.dim)].lock()
    }

    /// Lock two pending cells in canonical order.
    ///
    /// The caller's `a`/`b` roles (typically destination/origin) are
    /// preserved by the returned guard; only the acquisition order follows
    /// the packed-index comparison. `a == b` degenerates to a single
    /// acquisition performed once.
    pub fn acquire_pair(&self, a: Position, b: Position) -> PairGuard<'_> {
        let ai = a.index(self.dim);
        let bi = b.index(self.dim);
        if ai == bi {
            return PairGuard::Same(self.slots[ai].lock());
        }
        let (lo_index, hi_index, a_is_lo) = if ai < bi {
            (ai, bi, true)
        } else {
            (bi, ai, false)
        };
        let lo = self.slots[lo_index].lock();
        let hi = self.slots[hi_index].lock();
        PairGuard::Distinct { hi, lo, a_is_lo }
    }

    /// Exclusive iteration over the pending cells, for the sequential
    /// snapshot/commit brackets around a pass.
    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.slots.iter_mut().map(|slot| slot.get_mut())
    }
}

/// Guard over one or two locked pending cells.
pub enum PairGuard<'a> {
    /// Degenerate pair (`a == b`).
    Same(MutexGuard<'a, Cell>),
    /// Two distinct cells. `hi` is declared first so drop releases the
    /// higher index before the lower one, mirroring acquisition in reverse.
    Distinct {
        hi: MutexGuard<'a, Cell>,
        lo: MutexGuard<'a, Cell>,
        a_is_lo: bool,
    },
}

impl PairGuard<'_> {
    /// The cell requested as `a`.
    pub fn a_mut(&mut self) -> &mut Cell {
        match self {
            PairGuard::Same(guard) => &mut **guard,
            PairGuard::Distinct { hi, lo, a_is_lo } => {
                if *a_is_lo {
                    &mut **lo
                } else {
                    &mut **hi
                }
            }
        }
    }

    /// The cell requested as `b`.
    pub fn b_mut(&mut self) -> &mut Cell {
        match self {
            PairGuard::Same(guard) => &mut **guard,
            PairGuard::Distinct { hi, lo, a_is_lo } => {
                if *a_is_lo {
                    &mut **hi
                } else {
                    &mut **lo
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::Vitals;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_single_acquisition() {
        let table = LockTable::new(4);
        let mut guard = table.acquire_one(Position::new(1, 2));
        *guard = Cell::Producer;
        drop(guard);
        assert_eq!(*table.acquire_one(Position::new(1, 2)), Cell::Producer);
    }

    #[test]
    fn test_pair_preserves_caller_roles() {
        let table = LockTable::new(4);
        let dest = Position::new(0, 1);
        let origin = Position::new(3, 3);

        // Request with the higher index first; roles must not swap.
        let mut pair = table.acquire_pair(dest, origin);
        *pair.a_mut() = Cell::Producer;
        *pair.b_mut() = Cell::Prey(Vitals::newborn(2));
        drop(pair);

        assert_eq!(*table.acquire_one(dest), Cell::Producer);
        assert_eq!(*table.acquire_one(origin), Cell::Prey(Vitals::newborn(2)));
    }

    #[test]
    fn test_degenerate_pair() {
        let table = LockTable::new(4);
        let pos = Position::new(2, 2);
        let mut pair = table.acquire_pair(pos, pos);
        *pair.a_mut() = Cell::Producer;
        assert_eq!(*pair.b_mut(), Cell::Producer);
    }

    #[test]
    fn test_opposed_pair_orders_do_not_deadlock() {
        let table = Arc::new(LockTable::new(8));
        let a = Position::new(1, 1);
        let b = Position::new(6, 6);

        let mut handles = Vec::new();
        for flip in [false, true] {
            let table = Arc::clone(&table);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let (first, second) = if flip { (b, a) } else { (a, b) };
                    let mut pair = table.acquire_pair(first, second);
                    let bump = |cell: &mut Cell| {
                        *cell = match cell {
                            Cell::Empty => Cell::Producer,
                            _ => Cell::Empty,
                        };
                    };
                    bump(pair.a_mut());
                    bump(pair.b_mut());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // 2000 toggles per cell in total leaves both back at Empty.
        assert_eq!(*table.acquire_one(a), Cell::Empty);
        assert_eq!(*table.acquire_one(b), Cell::Empty);
    }
}
