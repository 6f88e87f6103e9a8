// Crowd density field
//
// Per-cell traversal multiplier derived from nearby occupants. Each
// occupant within the influence radius adds a linear falloff on top of
// the base cost; the sum is clipped to the configured maximum.

use itertools::iproduct;
use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::common::{CellState, Position, RoutingError, RoutingResult};
use crate::utils::Grid;

/// Stored in obstacle cells; never returned by [`DensityField::cost`]
pub const OBSTACLE_SENTINEL: f64 = -1.0;

/// Parameters of the density field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Occupants farther than this (Euclidean, in cells) have no effect
    pub influence_radius: f64,
    /// Contribution of an occupant sitting exactly on the cell
    pub falloff_weight: f64,
    /// Cost of a cell with no occupant nearby
    pub base_cost: f64,
    /// Upper clip of the summed cost
    pub max_cost: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            influence_radius: 3.0,
            falloff_weight: 3.0,
            base_cost: 1.0,
            max_cost: 12.0,
        }
    }
}

impl DensityConfig {
    pub fn with_influence_radius(mut self, radius: f64) -> Self {
        self.influence_radius = radius;
        self
    }

    pub fn with_bounds(mut self, base_cost: f64, max_cost: f64) -> Self {
        self.base_cost = base_cost;
        self.max_cost = max_cost;
        self
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if !(self.influence_radius.is_finite() && self.influence_radius > 0.0) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "influence radius must be positive and finite, got {}",
                self.influence_radius
            )));
        }
        if !(self.falloff_weight.is_finite() && self.falloff_weight >= 0.0) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "falloff weight must be non-negative, got {}",
                self.falloff_weight
            )));
        }
        if !(self.base_cost.is_finite() && self.base_cost > 0.0) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "base cost must be positive, got {}",
                self.base_cost
            )));
        }
        if !(self.max_cost.is_finite() && self.max_cost >= self.base_cost) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "density bounds [{}, {}] are not an interval",
                self.base_cost, self.max_cost
            )));
        }
        Ok(())
    }
}

/// Per-cell cost multipliers for one grid snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    data: DMatrix<f64>,
}

impl DensityField {
    /// Build from the grid's own `Occupied` cells
    pub fn build(grid: &Grid, config: &DensityConfig) -> RoutingResult<Self> {
        Self::build_with_occupants(grid, &grid.occupants(), config)
    }

    /// Build from an explicit occupant list
    ///
    /// Occupants are applied in row-major order regardless of the order
    /// they are passed in, so the field depends only on the set of
    /// positions.
    pub fn build_with_occupants(
        grid: &Grid,
        occupants: &[Position],
        config: &DensityConfig,
    ) -> RoutingResult<Self> {
        config.validate()?;

        let mut sorted = occupants.to_vec();
        sorted.sort();
        if let Some(bad) = sorted.iter().find(|&&p| !grid.is_traversable(p)) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "occupant {} is outside the grid or on an obstacle",
                bad
            )));
        }

        let (rows, cols) = (grid.rows(), grid.cols());
        let radius = config.influence_radius;
        // A window wider than the grid covers every cell anyway.
        let reach = radius.floor().min(rows.max(cols) as f64) as i32;
        let mut data = DMatrix::from_element(rows, cols, config.base_cost);

        // Only the cells inside each occupant's window can be affected.
        for occupant in &sorted {
            let r0 = occupant.row.saturating_sub(reach).max(0);
            let r1 = occupant.row.saturating_add(reach).min(rows as i32 - 1);
            let c0 = occupant.col.saturating_sub(reach).max(0);
            let c1 = occupant.col.saturating_add(reach).min(cols as i32 - 1);

            for (r, c) in iproduct!(r0..=r1, c0..=c1) {
                let d = occupant.distance(&Position::new(r, c));
                if d <= radius {
                    data[(r as usize, c as usize)] += config.falloff_weight * (radius - d) / radius;
                }
            }
        }

        for (r, c) in iproduct!(0..rows, 0..cols) {
            if grid[(r, c)] == CellState::Obstacle {
                data[(r, c)] = OBSTACLE_SENTINEL;
            } else {
                data[(r, c)] = data[(r, c)].min(config.max_cost);
            }
        }

        let field = DensityField { data };
        debug!(
            "density field {}x{}: {} occupants, radius {:.1}, cost range [{:.2}, {:.2}]",
            rows,
            cols,
            sorted.len(),
            radius,
            field.min_cost(),
            field.max_cost()
        );
        Ok(field)
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Cost multiplier of a cell, `None` for obstacles and out-of-bounds
    pub fn cost(&self, pos: Position) -> Option<f64> {
        if pos.row < 0 || pos.col < 0 {
            return None;
        }
        self.data
            .get((pos.row as usize, pos.col as usize))
            .copied()
            .filter(|&v| v != OBSTACLE_SENTINEL)
    }

    /// Non-obstacle multipliers in row-major order
    pub fn costs(&self) -> impl Iterator<Item = f64> + '_ {
        iproduct!(0..self.rows(), 0..self.cols())
            .map(move |(r, c)| self.data[(r, c)])
            .filter(|&v| v != OBSTACLE_SENTINEL)
    }

    /// Smallest multiplier, +inf when every cell is an obstacle
    pub fn min_cost(&self) -> f64 {
        self.costs().fold(f64::INFINITY, f64::min)
    }

    /// Largest multiplier, -inf when every cell is an obstacle
    pub fn max_cost(&self) -> f64 {
        self.costs().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Copy with cells within `band` (Chebyshev) of the boundary scaled by `factor`
    pub fn scaled_near_boundary(&self, band: i32, factor: f64) -> DensityField {
        let (rows, cols) = (self.rows() as i32, self.cols() as i32);
        let mut data = self.data.clone();
        for (r, c) in iproduct!(0..rows, 0..cols) {
            let to_edge = r.min(c).min(rows - 1 - r).min(cols - 1 - c);
            let cell = &mut data[(r as usize, c as usize)];
            if *cell != OBSTACLE_SENTINEL && to_edge <= band {
                *cell *= factor;
            }
        }
        DensityField { data }
    }

    /// Raw matrix, obstacle cells holding [`OBSTACLE_SENTINEL`]
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive_field(grid: &Grid, config: &DensityConfig) -> DMatrix<f64> {
        let occupants = grid.occupants();
        let mut data = DMatrix::from_element(grid.rows(), grid.cols(), 0.0);
        for pos in grid.positions() {
            let cell = &mut data[(pos.row as usize, pos.col as usize)];
            if grid.get(pos) == Some(CellState::Obstacle) {
                *cell = OBSTACLE_SENTINEL;
                continue;
            }
            let mut value = config.base_cost;
            for p in &occupants {
                let d = pos.distance(p);
                if d <= config.influence_radius {
                    value += config.falloff_weight * (config.influence_radius - d)
                        / config.influence_radius;
                }
            }
            *cell = value.min(config.max_cost);
        }
        data
    }

    #[test]
    fn test_occupant_free_field_is_base_cost() {
        let grid: Grid = "
            .....
            .#...
            ...#.
        "
        .parse()
        .unwrap();
        let field = DensityField::build(&grid, &DensityConfig::default()).unwrap();

        for pos in grid.positions() {
            match grid.get(pos) {
                Some(CellState::Obstacle) => assert_eq!(field.cost(pos), None),
                _ => assert_eq!(field.cost(pos), Some(1.0)),
            }
        }
    }

    #[test]
    fn test_single_occupant_falloff() {
        let mut grid = Grid::square(7).unwrap();
        grid.set(Position::new(3, 3), CellState::Occupied).unwrap();
        let field = DensityField::build(&grid, &DensityConfig::default()).unwrap();

        assert_relative_eq!(field.cost(Position::new(3, 3)).unwrap(), 4.0);
        assert_relative_eq!(field.cost(Position::new(3, 4)).unwrap(), 3.0);
        assert_relative_eq!(
            field.cost(Position::new(4, 4)).unwrap(),
            1.0 + (3.0 - 2_f64.sqrt())
        );
        // Exactly on the radius contributes zero
        assert_relative_eq!(field.cost(Position::new(3, 6)).unwrap(), 1.0);
        assert_relative_eq!(field.cost(Position::new(0, 0)).unwrap(), 1.0);
    }

    #[test]
    fn test_radius_wider_than_grid() {
        let mut grid = Grid::square(5).unwrap();
        grid.set(Position::new(2, 2), CellState::Occupied).unwrap();
        let config = DensityConfig::default().with_influence_radius(3.0e9);
        let field = DensityField::build(&grid, &config).unwrap();

        // Every cell is within reach and sees nearly the full falloff
        for pos in grid.positions() {
            assert_relative_eq!(field.cost(pos).unwrap(), 4.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_clipped_to_max_cost() {
        let grid: Grid = "
            PPPPP
            PPPPP
            PPPPP
        "
        .parse()
        .unwrap();
        let field = DensityField::build(&grid, &DensityConfig::default()).unwrap();
        assert_relative_eq!(field.max_cost(), 12.0);
        assert!(field.costs().all(|v| (1.0..=12.0).contains(&v)));
    }

    #[test]
    fn test_windowed_build_matches_all_pairs() {
        let mut rng = StdRng::seed_from_u64(7);
        for radius in [1.0, 2.5, 3.0, 4.0, 40.0, 1e12] {
            let mut grid = Grid::square(16).unwrap();
            let cells: Vec<Position> = grid.positions().collect();
            for pos in cells {
                let roll: f64 = rng.gen();
                if roll < 0.1 {
                    grid.set(pos, CellState::Obstacle).unwrap();
                } else if roll < 0.25 {
                    grid.set(pos, CellState::Occupied).unwrap();
                }
            }
            let config = DensityConfig::default().with_influence_radius(radius);
            let field = DensityField::build(&grid, &config).unwrap();
            assert_eq!(field.as_matrix(), &naive_field(&grid, &config));
        }
    }

    #[test]
    fn test_build_is_pure() {
        let grid: Grid = "
            ..P..
            .#...
            ...P.
        "
        .parse()
        .unwrap();
        let config = DensityConfig::default();
        let a = DensityField::build(&grid, &config).unwrap();
        let b = DensityField::build(&grid, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_occupant_order_irrelevant() {
        let grid = Grid::square(6).unwrap();
        let config = DensityConfig::default();
        let forward = [Position::new(1, 1), Position::new(2, 3), Position::new(4, 4)];
        let mut backward = forward;
        backward.reverse();
        assert_eq!(
            DensityField::build_with_occupants(&grid, &forward, &config).unwrap(),
            DensityField::build_with_occupants(&grid, &backward, &config).unwrap()
        );
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let grid = Grid::square(3).unwrap();
        for radius in [0.0, -1.0, f64::NAN] {
            let config = DensityConfig::default().with_influence_radius(radius);
            assert!(matches!(
                DensityField::build(&grid, &config),
                Err(RoutingError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let config = DensityConfig::default().with_bounds(5.0, 2.0);
        assert!(config.validate().is_err());
        let config = DensityConfig::default().with_bounds(0.0, 12.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_occupant_outside_grid_rejected() {
        let grid = Grid::square(3).unwrap();
        let result =
            DensityField::build_with_occupants(&grid, &[Position::new(5, 0)], &DensityConfig::default());
        assert!(matches!(result, Err(RoutingError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_scaled_near_boundary() {
        let grid: Grid = "
            .......
            .......
            .......
            ...#...
            .......
            .......
            .......
        "
        .parse()
        .unwrap();
        let field = DensityField::build(&grid, &DensityConfig::default()).unwrap();
        let scaled = field.scaled_near_boundary(2, 0.7);

        assert_relative_eq!(scaled.cost(Position::new(0, 3)).unwrap(), 0.7);
        assert_relative_eq!(scaled.cost(Position::new(2, 2)).unwrap(), 0.7);
        assert_eq!(scaled.cost(Position::new(3, 3)), None);
        assert_relative_eq!(scaled.min_cost(), 0.7);
        // Source field untouched
        assert_relative_eq!(field.min_cost(), 1.0);
    }
}
