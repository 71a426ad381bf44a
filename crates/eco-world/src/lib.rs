//! Concurrent double-buffered ecosystem engine.
//!
//! A fixed-size grid of producers, prey, and predators advances through
//! discrete ticks. Each tick runs one parallel pass per species kernel:
//! decisions read an immutable committed snapshot, writes land in a
//! pending buffer behind a per-cell lock table, and contested destinations
//! are settled by a deterministic claim table before the pass commits.

pub mod claims;
pub mod driver;
pub mod grid;
pub mod kernels;
pub mod locks;
pub mod simulation;

pub use claims::ClaimTable;
pub use driver::TickDriver;
pub use grid::{Census, Grid, GridState};
pub use locks::{LockTable, PairGuard};
pub use simulation::{RunSummary, Simulation};
