//! Per-pass destination claims.
//!
//! Two organisms may pick the same destination cell from the same committed
//! snapshot. Locks alone would serialize the writes but leave the winner up
//! to thread scheduling, silently discarding one organism. Instead, every
//! move/feed/reproduce/colonize target is claimed here before anything is
//! written: the slot keeps the lowest packed origin index filed for it, so
//! the winner is a pure function of the snapshot. Losers take their idle
//! branch and stay where they are; population is conserved by construction.

use std::sync::atomic::{AtomicU32, Ordering};

const UNCLAIMED: u32 = u32::MAX;

/// One ownership token per grid cell, reset before each kernel pass.
pub struct ClaimTable {
    slots: Vec<AtomicU32>,
}

impl ClaimTable {
    pub fn new(len: usize) -> Self {
        let slots = (0..len).map(|_| AtomicU32::new(UNCLAIMED)).collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Clear all claims. Runs between passes, never concurrently with one.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot.get_mut() = UNCLAIMED;
        }
    }

    /// File a claim on `dest` for the organism at `origin`.
    ///
    /// Lowest origin index wins regardless of filing order.
    pub fn file(&self, dest: usize, origin: u32) {
        self.slots[dest].fetch_min(origin, Ordering::AcqRel);
    }

    /// Whether `origin` holds the winning claim on `dest`.
    ///
    /// Only meaningful after the claim phase has fully finished.
    pub fn won(&self, dest: usize, origin: u32) -> bool {
        self.slots[dest].load(Ordering::Acquire) == origin
    }
}
