//! Common traits defining interfaces for route planners

use crate::common::error::RoutingError;
use crate::common::types::*;

/// Trait for grid-based path planning algorithms
pub trait GridPathPlanner {
    /// Plan a path on the grid from start to goal
    ///
    /// Fails only on bad endpoints; an unreachable goal is reported
    /// through [`PathResult::outcome`].
    fn plan(&self, start: Position, goal: Position) -> Result<PathResult, RoutingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that traits compile correctly
    struct DummyPlanner;

    impl GridPathPlanner for DummyPlanner {
        fn plan(&self, start: Position, _goal: Position) -> Result<PathResult, RoutingError> {
            Ok(PathResult::found(vec![start], 0.0, vec![start], 1))
        }
    }

    #[test]
    fn test_grid_path_planner_trait() {
        let planner = DummyPlanner;
        let result = planner.plan(Position::new(0, 0), Position::new(1, 1));
        assert!(result.is_ok());
    }
}
