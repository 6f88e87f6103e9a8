//! Common types used throughout crowd_routing

use serde::{Deserialize, Serialize};

/// Integer grid position (row, col)
///
/// Signed so that neighbor offsets and out-of-range endpoints can be
/// represented and rejected explicitly instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position shifted by (d_row, d_col)
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Euclidean distance between cell centers
    pub fn distance(&self, other: &Position) -> f64 {
        let dr = (self.row - other.row) as f64;
        let dc = (self.col - other.col) as f64;
        (dr * dr + dc * dc).sqrt()
    }

    /// True when the two positions differ in both row and column
    pub fn is_diagonal_to(&self, other: &Position) -> bool {
        self.row != other.row && self.col != other.col
    }
}

impl From<(i32, i32)> for Position {
    fn from(tuple: (i32, i32)) -> Self {
        Self {
            row: tuple.0,
            col: tuple.1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// State of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellState {
    #[default]
    Empty,
    Obstacle,
    Occupied,
}

impl CellState {
    /// Integer code used by the crowd simulation (-1 obstacle, 0 empty, 1 person)
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(CellState::Obstacle),
            0 => Some(CellState::Empty),
            1 => Some(CellState::Occupied),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            CellState::Obstacle => -1,
            CellState::Empty => 0,
            CellState::Occupied => 1,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self, CellState::Obstacle)
    }
}

/// How a single search call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Goal reached; the path is non-empty
    Found,
    /// Frontier exhausted without reaching the goal
    Unreachable,
    /// Expansion budget ran out before the search finished
    Aborted,
}

/// Result of a grid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Positions from start to goal inclusive (empty unless `Found`)
    pub path: Vec<Position>,
    /// Sum of edge costs along `path` (+inf unless `Found`)
    pub cost: f64,
    /// Cells expanded by the search, in expansion order, each listed once
    pub explored: Vec<Position>,
    /// Number of frontier pops, stale entries included
    pub iterations: usize,
    pub outcome: SearchOutcome,
}

impl PathResult {
    pub(crate) fn found(
        path: Vec<Position>,
        cost: f64,
        explored: Vec<Position>,
        iterations: usize,
    ) -> Self {
        Self {
            path,
            cost,
            explored,
            iterations,
            outcome: SearchOutcome::Found,
        }
    }

    pub(crate) fn failed(outcome: SearchOutcome, explored: Vec<Position>, iterations: usize) -> Self {
        Self {
            path: Vec::new(),
            cost: f64::INFINITY,
            explored,
            iterations,
            outcome,
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == SearchOutcome::Found
    }

    /// Number of waypoints in the path
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Geometric length of the path, ignoring density
    pub fn total_length(&self) -> f64 {
        self.path.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}
