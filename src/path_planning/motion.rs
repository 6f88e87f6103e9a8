//! Movement cost model for the 8-connected grid
//!
//! An edge from a cell to one of its eight neighbors costs the geometric
//! step length (1 axis-aligned, `diagonal_step` diagonal) multiplied by the
//! destination cell's density. A [`CostProfile`] is an immutable value
//! threaded through each search; nothing here holds shared state.

use std::borrow::Cow;
use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::common::{Position, RoutingError, RoutingResult};
use crate::mapping::DensityField;
use crate::utils::Grid;

/// Diagonal step cost used by the "Direct Route" strategy
pub const DIRECT_ROUTE_DIAGONAL_STEP: f64 = 1.1;

/// Neighbor offsets (d_row, d_col): N, S, W, E, then NW, NE, SW, SE
pub const MOTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Density scaling applied near the grid boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryBand {
    /// Cells with Chebyshev distance to the edge `<= width` are scaled
    pub width: i32,
    pub factor: f64,
}

/// Cost-profile transform applied to one search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostProfile {
    /// Base cost of a diagonal step
    pub diagonal_step: f64,
    /// Optional boundary scaling of the density field
    pub boundary_band: Option<BoundaryBand>,
}

impl Default for CostProfile {
    fn default() -> Self {
        Self {
            diagonal_step: SQRT_2,
            boundary_band: None,
        }
    }
}

impl CostProfile {
    /// Unmodified field, geometric diagonal
    pub fn density_avoiding() -> Self {
        Self::default()
    }

    /// Density within 2 cells of the boundary scaled by 0.7
    pub fn edge_preferring() -> Self {
        Self {
            boundary_band: Some(BoundaryBand {
                width: 2,
                factor: 0.7,
            }),
            ..Self::default()
        }
    }

    /// Cheaper diagonals, field unchanged
    pub fn direct_route() -> Self {
        Self {
            diagonal_step: DIRECT_ROUTE_DIAGONAL_STEP,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if !(self.diagonal_step.is_finite() && self.diagonal_step > 0.0) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "diagonal step cost must be positive, got {}",
                self.diagonal_step
            )));
        }
        if let Some(band) = self.boundary_band {
            if band.width < 0 || !(band.factor.is_finite() && band.factor > 0.0) {
                return Err(RoutingError::InvalidConfiguration(format!(
                    "boundary band needs width >= 0 and factor > 0, got {:?}",
                    band
                )));
            }
        }
        Ok(())
    }

    /// Base step cost between two adjacent cells
    pub fn step_cost(&self, from: Position, to: Position) -> f64 {
        if from.is_diagonal_to(&to) {
            self.diagonal_step
        } else {
            1.0
        }
    }

    /// Field as seen by this profile
    pub fn apply<'a>(&self, field: &'a DensityField) -> Cow<'a, DensityField> {
        match self.boundary_band {
            Some(band) => Cow::Owned(field.scaled_near_boundary(band.width, band.factor)),
            None => Cow::Borrowed(field),
        }
    }

    /// Factor keeping the Euclidean heuristic a lower bound on path cost
    ///
    /// Every edge costs at least `scale * step_length`, so `scale * euclid`
    /// is admissible and consistent. Exactly 1 for the default profile on
    /// a field with costs >= 1.
    pub fn heuristic_scale(&self, min_density: f64) -> f64 {
        min_density.min(1.0) * (self.diagonal_step / SQRT_2).min(1.0)
    }
}

/// Cost of moving from `from` to the adjacent cell `to`
///
/// `None` when `to` is not one of the 8 neighbors, is out of bounds, or
/// is an obstacle.
pub fn edge_cost(
    grid: &Grid,
    field: &DensityField,
    profile: &CostProfile,
    from: Position,
    to: Position,
) -> Option<f64> {
    let (dr, dc) = (to.row - from.row, to.col - from.col);
    if !MOTIONS.contains(&(dr, dc)) || !grid.is_traversable(to) {
        return None;
    }
    field
        .cost(to)
        .map(|density| profile.step_cost(from, to) * density)
}

/// Sum of edge costs along a path, `None` if any step is not a valid edge
pub fn path_cost(
    grid: &Grid,
    field: &DensityField,
    profile: &CostProfile,
    path: &[Position],
) -> Option<f64> {
    path.windows(2)
        .map(|w| edge_cost(grid, field, profile, w[0], w[1]))
        .sum()
}
