//! Core type definitions for the ecosystem simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Empty,
    Producer,
    Prey,
    Predator,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Empty => "empty",
            Kind::Producer => "producer",
            Kind::Prey => "prey",
            Kind::Predator => "predator",
        };
        write!(f, "{name}")
    }
}

/// Mutable state carried by prey and predators.
///
/// Producers and empty cells carry no dynamic fields; producer growth and
/// death depend only on neighbor occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    /// Remaining energy; non-positive energy is fatal at the next pass.
    pub energy: i32,
    /// Ticks since the last successful feeding.
    pub hunger_ticks: u32,
    /// Ticks survived.
    pub age: u32,
}

impl Vitals {
    pub fn newborn(energy: i32) -> Self {
        Self {
            energy,
            hunger_ticks: 0,
            age: 0,
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Producer,
    Prey(Vitals),
    Predator(Vitals),
}

impl Cell {
    pub fn kind(&self) -> Kind {
        match self {
            Cell::Empty => Kind::Empty,
            Cell::Producer => Kind::Producer,
            Cell::Prey(_) => Kind::Prey,
            Cell::Predator(_) => Kind::Predator,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn vitals(&self) -> Option<Vitals> {
        match self {
            Cell::Prey(v) | Cell::Predator(v) => Some(*v),
            _ => None,
        }
    }

    pub fn vitals_mut(&mut self) -> Option<&mut Vitals> {
        match self {
            Cell::Prey(v) | Cell::Predator(v) => Some(v),
            _ => None,
        }
    }

    /// Build an organism cell of the given kind.
    ///
    /// Panics if `kind` carries no vitals; that is a logic error at the
    /// call site.
    pub fn organism(kind: Kind, vitals: Vitals) -> Self {
        match kind {
            Kind::Prey => Cell::Prey(vitals),
            Kind::Predator => Cell::Predator(vitals),
            _ => panic!("kind {kind} carries no vitals"),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// 2D position on the grid, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn step(&self, dir: Direction) -> Self {
        let (dr, dc) = dir.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Whether this position lies inside a `dim` x `dim` grid.
    pub fn in_bounds(&self, dim: usize) -> bool {
        let dim = dim as i32;
        self.row >= 0 && self.row < dim && self.col >= 0 && self.col < dim
    }

    /// Packed row-major index. Doubles as the canonical total order for
    /// multi-cell lock acquisition.
    pub fn index(&self, dim: usize) -> usize {
        self.row as usize * dim + self.col as usize
    }

    pub fn from_index(index: usize, dim: usize) -> Self {
        Self {
            row: (index / dim) as i32,
            col: (index % dim) as i32,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
        }
    }

    /// The fixed neighbor scan order used by every kernel.
    pub fn scan_order() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }
}
