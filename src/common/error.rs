//! Error types for crowd_routing

use thiserror::Error;

use crate::common::types::Position;

/// Which end of a route request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Main error type for route planning
///
/// An unreachable goal is not an error; see
/// [`SearchOutcome`](crate::common::SearchOutcome).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// Start or goal lies outside the grid or on an obstacle
    #[error("Invalid {endpoint} position {position}: {reason}")]
    InvalidEndpoint {
        endpoint: Endpoint,
        position: Position,
        reason: String,
    },

    /// The strategy planner was asked to run zero strategies
    #[error("Empty strategy set: at least one strategy is required")]
    EmptyStrategySet,

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Text grid layout could not be parsed
    #[error("Grid parse error: {0}")]
    GridParse(String),
}

/// Result type alias for routing operations
pub type RoutingResult<T> = Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoutingError::InvalidEndpoint {
            endpoint: Endpoint::Goal,
            position: Position::new(1, 2),
            reason: "cell is an obstacle".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid goal position (1, 2): cell is an obstacle"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = RoutingError::InvalidConfiguration("influence radius must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: influence radius must be positive"
        );
        assert_eq!(
            RoutingError::EmptyStrategySet.to_string(),
            "Empty strategy set: at least one strategy is required"
        );
    }
}
