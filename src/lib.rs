//! crowd_routing - density-aware route planning on occupancy grids
//!
//! Plans routes across a grid of static obstacles and moving occupants.
//! Occupants raise the traversal cost of nearby cells, so routes avoid
//! crowds while staying optimal under that cost model.
//!
//! Pipeline: [`DensityField`] → [`edge_cost`] → [`AStarPlanner`] →
//! (optionally) [`MultiStrategyPlanner`] → [`PathSmoother`].
//!
//! ```rust
//! use crowd_routing::{Grid, MultiStrategyPlanner, PlannerConfig, Position, smooth_path};
//!
//! let grid: Grid = "
//!     ......
//!     ..P...
//!     ..##..
//!     ......
//! ".parse().unwrap();
//!
//! let planner = MultiStrategyPlanner::new(PlannerConfig::default()).unwrap();
//! let routes = planner.plan(&grid, Position::new(0, 0), Position::new(3, 5)).unwrap();
//! assert_eq!(routes[0].name(), "Density Avoiding");
//!
//! let waypoints = smooth_path(&routes[0].result.path, &grid);
//! assert_eq!(waypoints.first(), Some(&Position::new(0, 0)));
//! ```

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{CellState, Endpoint, PathResult, Position, SearchOutcome};
pub use common::GridPathPlanner;
pub use common::{RoutingError, RoutingResult};
pub use mapping::{DensityConfig, DensityField};
pub use path_planning::{
    edge_cost, find_path, path_cost, smooth_path, AStarConfig, AStarPlanner, CostProfile,
    MultiStrategyPlanner, PathSmoother, PlannerConfig, Strategy, StrategyResult, TieBreak,
};
pub use utils::Grid;
