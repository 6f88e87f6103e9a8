//! Alternative routes from distinct cost profiles
//!
//! Runs A* once per requested [`Strategy`] between the same endpoints.
//! Each strategy maps to an immutable [`CostProfile`], so the runs share
//! nothing mutable and may be executed independently.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::a_star::{validate_endpoints, AStarConfig, AStarPlanner};
use super::motion::CostProfile;
use crate::common::{
    GridPathPlanner, PathResult, Position, RoutingError, RoutingResult, SearchOutcome,
};
use crate::mapping::{DensityConfig, DensityField};
use crate::utils::Grid;

/// Named cost-profile variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    DensityAvoiding,
    EdgePreferring,
    DirectRoute,
}

impl Strategy {
    /// All strategies in their default run order
    pub const ALL: [Strategy; 3] = [
        Strategy::DensityAvoiding,
        Strategy::EdgePreferring,
        Strategy::DirectRoute,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::DensityAvoiding => "Density Avoiding",
            Strategy::EdgePreferring => "Edge Preferring",
            Strategy::DirectRoute => "Direct Route",
        }
    }

    pub fn profile(&self) -> CostProfile {
        match self {
            Strategy::DensityAvoiding => CostProfile::density_avoiding(),
            Strategy::EdgePreferring => CostProfile::edge_preferring(),
            Strategy::DirectRoute => CostProfile::direct_route(),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A path tagged with the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: Strategy,
    pub result: PathResult,
}

impl StrategyResult {
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }
}

/// Configuration for [`MultiStrategyPlanner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub density: DensityConfig,
    pub search: AStarConfig,
    /// Strategies to run, in order
    pub strategies: Vec<Strategy>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            density: DensityConfig::default(),
            search: AStarConfig::default(),
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl PlannerConfig {
    pub fn with_strategies(mut self, strategies: &[Strategy]) -> Self {
        self.strategies = strategies.to_vec();
        self
    }

    pub fn with_density(mut self, density: DensityConfig) -> Self {
        self.density = density;
        self
    }

    pub fn with_search(mut self, search: AStarConfig) -> Self {
        self.search = search;
        self
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if self.strategies.is_empty() {
            return Err(RoutingError::EmptyStrategySet);
        }
        for (i, strategy) in self.strategies.iter().enumerate() {
            if self.strategies[..i].contains(strategy) {
                return Err(RoutingError::InvalidConfiguration(format!(
                    "strategy '{}' requested more than once",
                    strategy
                )));
            }
        }
        self.density.validate()?;
        self.search.validate()
    }
}

/// Produces up to one route per strategy, dropping duplicates
#[derive(Debug, Clone)]
pub struct MultiStrategyPlanner {
    config: PlannerConfig,
}

impl MultiStrategyPlanner {
    pub fn new(config: PlannerConfig) -> RoutingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan using the grid's own `Occupied` cells as the crowd
    pub fn plan(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
    ) -> RoutingResult<Vec<StrategyResult>> {
        validate_endpoints(grid, start, goal)?;
        let field = DensityField::build(grid, &self.config.density)?;
        self.plan_with_field(grid, &field, start, goal)
    }

    /// Plan with occupant positions supplied separately from the grid
    pub fn plan_with_occupants(
        &self,
        grid: &Grid,
        occupants: &[Position],
        start: Position,
        goal: Position,
    ) -> RoutingResult<Vec<StrategyResult>> {
        validate_endpoints(grid, start, goal)?;
        let field = DensityField::build_with_occupants(grid, occupants, &self.config.density)?;
        self.plan_with_field(grid, &field, start, goal)
    }

    /// Plan against a prebuilt density field
    ///
    /// A strategy whose path equals an already accepted one is dropped,
    /// except Density Avoiding, which is always kept when it finds a
    /// path. An empty result means no strategy reached the goal.
    ///
    /// Endpoints are checked by the first search, before any result is
    /// accepted.
    pub fn plan_with_field(
        &self,
        grid: &Grid,
        field: &DensityField,
        start: Position,
        goal: Position,
    ) -> RoutingResult<Vec<StrategyResult>> {
        let mut accepted: Vec<StrategyResult> = Vec::with_capacity(self.config.strategies.len());
        for &strategy in &self.config.strategies {
            let planner =
                AStarPlanner::new(grid, field, strategy.profile(), self.config.search.clone())?;
            let result = planner.plan(start, goal)?;

            if !result.is_found() {
                if result.outcome == SearchOutcome::Aborted {
                    warn!("[{}] search aborted by expansion budget", strategy);
                } else {
                    debug!("[{}] no path from {} to {}", strategy, start, goal);
                }
                continue;
            }

            let duplicate = accepted.iter().any(|a| a.result.path == result.path);
            if duplicate && strategy != Strategy::DensityAvoiding {
                debug!("[{}] path duplicates an accepted route, dropped", strategy);
                continue;
            }

            debug!(
                "[{}] accepted: {} waypoints, cost {:.3}",
                strategy,
                result.len(),
                result.cost
            );
            accepted.push(StrategyResult { strategy, result });
        }

        Ok(accepted)
    }
}
