//! Path smoothing by line-of-sight shortcuts
//!
//! Drops waypoints that can be skipped along a straight, obstacle-free
//! line. The output is always a subsequence of the input with the same
//! first and last positions.

use log::trace;

use crate::common::{PathResult, Position};
use crate::utils::Grid;

/// Bresenham walk from one cell to another, endpoints included
#[derive(Debug, Clone)]
pub struct LineCells {
    current: Option<Position>,
    to: Position,
    dr: i32,
    dc: i32,
    sr: i32,
    sc: i32,
    err: i32,
}

impl LineCells {
    pub fn new(from: Position, to: Position) -> Self {
        let dr = (to.row - from.row).abs();
        let dc = (to.col - from.col).abs();
        Self {
            current: Some(from),
            to,
            dr,
            dc,
            sr: if from.row < to.row { 1 } else { -1 },
            sc: if from.col < to.col { 1 } else { -1 },
            err: dr - dc,
        }
    }
}

impl Iterator for LineCells {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        let cell = self.current?;
        if cell == self.to {
            self.current = None;
            return Some(cell);
        }

        let (mut r, mut c) = (cell.row, cell.col);
        let e2 = 2 * self.err;
        if e2 > -self.dc {
            self.err -= self.dc;
            r += self.sr;
        }
        if e2 < self.dr {
            self.err += self.dr;
            c += self.sc;
        }
        self.current = Some(Position::new(r, c));
        Some(cell)
    }
}

/// Cells visited by the Bresenham line from `from` to `to`, endpoints included
pub fn rasterize_line(from: Position, to: Position) -> Vec<Position> {
    LineCells::new(from, to).collect()
}

/// Check if there is line-of-sight between two grid cells
///
/// Every rasterized cell must be in bounds and not an obstacle. Stops at
/// the first blocked cell.
pub fn has_line_of_sight(grid: &Grid, from: Position, to: Position) -> bool {
    LineCells::new(from, to).all(|cell| grid.is_traversable(cell))
}

/// Greedy line-of-sight path smoother
pub struct PathSmoother<'a> {
    grid: &'a Grid,
}

impl<'a> PathSmoother<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Jump from each waypoint to the farthest later waypoint in sight
    ///
    /// If no later waypoint is visible the smoother advances by one.
    /// Paths of length <= 2 are returned unchanged.
    pub fn smooth(&self, path: &[Position]) -> Vec<Position> {
        if path.len() <= 2 {
            return path.to_vec();
        }

        let mut smoothed = vec![path[0]];
        let mut i = 0;

        while i < path.len() - 1 {
            let farthest = (i + 1..path.len())
                .rev()
                .find(|&j| has_line_of_sight(self.grid, path[i], path[j]));

            i = farthest.unwrap_or(i + 1);
            smoothed.push(path[i]);
        }

        trace!(
            "[Smoother] {} waypoints reduced to {}",
            path.len(),
            smoothed.len()
        );
        smoothed
    }

    /// Smoothed waypoints of a search result (empty for failed searches)
    pub fn smooth_result(&self, result: &PathResult) -> Vec<Position> {
        self.smooth(&result.path)
    }
}

/// Smooth a path against the grid with default settings
pub fn smooth_path(path: &[Position], grid: &Grid) -> Vec<Position> {
    PathSmoother::new(grid).smooth(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CellState, GridPathPlanner};
    use crate::mapping::{DensityConfig, DensityField};
    use crate::path_planning::a_star::AStarPlanner;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn create_wall_grid() -> Grid {
        "
        ..........
        ..........
        ....#.....
        ....#.....
        ....#.....
        ....#.....
        ..........
        ..........
        "
        .parse()
        .unwrap()
    }

    fn is_subsequence(sub: &[Position], full: &[Position]) -> bool {
        let mut it = full.iter();
        sub.iter().all(|p| it.any(|q| q == p))
    }

    #[test]
    fn test_rasterize_line_endpoints() {
        let cells = rasterize_line(Position::new(0, 0), Position::new(2, 5));
        assert_eq!(cells.first(), Some(&Position::new(0, 0)));
        assert_eq!(cells.last(), Some(&Position::new(2, 5)));
        assert_eq!(cells.len(), 6);

        assert_eq!(
            rasterize_line(Position::new(3, 3), Position::new(3, 3)),
            vec![Position::new(3, 3)]
        );
    }

    #[test]
    fn test_line_cells_stop_at_goal() {
        let mut line = LineCells::new(Position::new(4, 1), Position::new(0, 3));
        let cells: Vec<Position> = line.by_ref().collect();
        assert_eq!(cells.first(), Some(&Position::new(4, 1)));
        assert_eq!(cells.last(), Some(&Position::new(0, 3)));
        assert!(cells
            .windows(2)
            .all(|w| (w[1].row - w[0].row).abs() <= 1 && (w[1].col - w[0].col).abs() <= 1));
        assert_eq!(line.next(), None);
    }

    #[test]
    fn test_line_of_sight_stops_at_first_block() {
        let grid = create_wall_grid();
        // The far end is out of bounds, but the wall is hit first
        let mut visited = 0;
        let blocked = LineCells::new(Position::new(3, 0), Position::new(3, 20))
            .inspect(|_| visited += 1)
            .all(|cell| grid.is_traversable(cell));
        assert!(!blocked);
        assert_eq!(visited, 5);
    }

    #[test]
    fn test_line_of_sight() {
        let grid = create_wall_grid();

        // Clear line of sight
        assert!(has_line_of_sight(&grid, Position::new(0, 0), Position::new(1, 9)));

        // Blocked by the wall at column 4
        assert!(!has_line_of_sight(&grid, Position::new(3, 0), Position::new(3, 9)));

        // Out of bounds
        assert!(!has_line_of_sight(&grid, Position::new(0, 0), Position::new(0, 10)));
    }

    #[test]
    fn test_short_paths_unchanged() {
        let grid = create_wall_grid();
        let path = vec![Position::new(0, 0), Position::new(0, 1)];
        assert_eq!(smooth_path(&path, &grid), path);
        assert!(smooth_path(&[], &grid).is_empty());
    }

    #[test]
    fn test_straight_run_collapses() {
        let grid = create_wall_grid();
        let path: Vec<Position> = (0..10).map(|c| Position::new(0, c)).collect();
        assert_eq!(
            smooth_path(&path, &grid),
            vec![Position::new(0, 0), Position::new(0, 9)]
        );
    }

    #[test]
    fn test_smoothing_properties_on_planned_paths() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut checked = 0;

        while checked < 15 {
            let mut grid = Grid::square(14).unwrap();
            let cells: Vec<Position> = grid.positions().collect();
            for pos in cells {
                let roll: f64 = rng.gen();
                if roll < 0.22 {
                    grid.set(pos, CellState::Obstacle).unwrap();
                } else if roll < 0.3 {
                    grid.set(pos, CellState::Occupied).unwrap();
                }
            }
            let start = Position::new(0, 0);
            let goal = Position::new(13, 13);
            grid.set(start, CellState::Empty).unwrap();
            grid.set(goal, CellState::Empty).unwrap();

            let field = DensityField::build(&grid, &DensityConfig::default()).unwrap();
            let planner = AStarPlanner::with_defaults(&grid, &field).unwrap();
            let result = planner.plan(start, goal).unwrap();
            if !result.is_found() {
                continue;
            }
            checked += 1;

            let smoother = PathSmoother::new(&grid);
            let once = smoother.smooth_result(&result);
            let twice = smoother.smooth(&once);

            assert_eq!(once.first(), Some(&start));
            assert_eq!(once.last(), Some(&goal));
            assert!(is_subsequence(&once, &result.path));
            assert!(once.windows(2).all(|w| has_line_of_sight(&grid, w[0], w[1])));
            assert_eq!(once, twice);
        }
    }
}
