// grid map definition
// Occupancy snapshot handed over by the crowd simulation

use std::ops::Deref;
use std::str::FromStr;

use itertools::iproduct;
extern crate nalgebra as na;

use crate::common::{CellState, Position, RoutingError, RoutingResult};

/// Immutable-per-call snapshot of cell states
///
/// Rows and columns are both positive. Cells are addressed by
/// [`Position`]; dense per-cell arrays elsewhere in the crate use the
/// row-major index returned by [`Grid::index`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: na::DMatrix<CellState>,
}

impl Grid {
    /// Empty grid of the given dimensions
    pub fn new(rows: usize, cols: usize) -> RoutingResult<Self> {
        check_dimensions(rows, cols)?;
        Self::from_matrix(na::DMatrix::from_element(rows, cols, CellState::Empty))
    }

    /// Empty N×N grid
    pub fn square(size: usize) -> RoutingResult<Self> {
        Self::new(size, size)
    }

    pub fn from_matrix(cells: na::DMatrix<CellState>) -> RoutingResult<Self> {
        check_dimensions(cells.nrows(), cells.ncols())?;
        Ok(Self { cells })
    }

    /// Build from the simulation's integer codes (-1 obstacle, 0 empty, 1 person)
    pub fn from_codes(codes: &[Vec<i32>]) -> RoutingResult<Self> {
        let rows = codes.len();
        let cols = codes.first().map_or(0, |r| r.len());
        if let Some((i, row)) = codes.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                cols
            )));
        }

        let mut cells = na::DMatrix::from_element(rows, cols, CellState::Empty);
        for (i, j) in iproduct!(0..rows, 0..cols) {
            cells[(i, j)] = CellState::from_code(codes[i][j]).ok_or_else(|| {
                RoutingError::InvalidConfiguration(format!(
                    "unknown cell code {} at ({}, {})",
                    codes[i][j], i, j
                ))
            })?;
        }
        Self::from_matrix(cells)
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows()
            && (pos.col as usize) < self.cols()
    }

    pub fn get(&self, pos: Position) -> Option<CellState> {
        if self.contains(pos) {
            Some(self.cells[(pos.row as usize, pos.col as usize)])
        } else {
            None
        }
    }

    /// Update one cell while assembling a snapshot
    pub fn set(&mut self, pos: Position, state: CellState) -> RoutingResult<()> {
        if !self.contains(pos) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "position {} is outside the {}x{} grid",
                pos,
                self.rows(),
                self.cols()
            )));
        }
        self.cells[(pos.row as usize, pos.col as usize)] = state;
        Ok(())
    }

    /// In bounds and not an obstacle
    pub fn is_traversable(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(state) if !state.is_obstacle())
    }

    /// Row-major index into dense per-cell arrays
    pub fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row as usize * self.cols() + pos.col as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Grid::index`]
    pub fn position(&self, index: usize) -> Position {
        Position::new((index / self.cols()) as i32, (index % self.cols()) as i32)
    }

    /// Chebyshev distance from an in-bounds cell to the nearest grid edge
    pub fn distance_to_boundary(&self, pos: Position) -> i32 {
        let last_row = self.rows() as i32 - 1;
        let last_col = self.cols() as i32 - 1;
        pos.row
            .min(pos.col)
            .min(last_row - pos.row)
            .min(last_col - pos.col)
    }

    /// Occupied cells in row-major order
    pub fn occupants(&self) -> Vec<Position> {
        self.positions()
            .filter(|&p| self.get(p) == Some(CellState::Occupied))
            .collect()
    }

    /// Every cell position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.rows() as i32, 0..self.cols() as i32).map(|(r, c)| Position::new(r, c))
    }
}

/// Both sides positive and addressable by a `Position` coordinate
fn check_dimensions(rows: usize, cols: usize) -> RoutingResult<()> {
    if rows == 0 || cols == 0 {
        return Err(RoutingError::InvalidConfiguration(format!(
            "grid dimensions must be positive, got {}x{}",
            rows, cols
        )));
    }
    if rows > i32::MAX as usize || cols > i32::MAX as usize {
        return Err(RoutingError::InvalidConfiguration(format!(
            "grid dimensions {}x{} exceed the coordinate range",
            rows, cols
        )));
    }
    Ok(())
}

impl Deref for Grid {
    type Target = na::DMatrix<CellState>;

    fn deref(&self) -> &Self::Target {
        &self.cells
    }
}

/// Text layout: `#` obstacle, `.` empty, `P` occupied; one line per row.
/// Blank lines and surrounding whitespace are ignored.
impl FromStr for Grid {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let codes = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                line.chars()
                    .map(|ch| match ch {
                        '#' => Ok(CellState::Obstacle.code()),
                        '.' => Ok(CellState::Empty.code()),
                        'P' => Ok(CellState::Occupied.code()),
                        other => Err(RoutingError::GridParse(format!(
                            "unexpected character '{}' on line {}",
                            other,
                            i + 1
                        ))),
                    })
                    .collect::<RoutingResult<Vec<i32>>>()
            })
            .collect::<RoutingResult<Vec<Vec<i32>>>>()?;

        if codes.is_empty() {
            return Err(RoutingError::GridParse("layout has no rows".to_string()));
        }
        Self::from_codes(&codes).map_err(|e| RoutingError::GridParse(e.to_string()))
    }
}
