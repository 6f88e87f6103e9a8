//! A* search over the crowd-density cost field
//!
//! Best-first search on the 8-connected grid. Edge costs come from
//! [`edge_cost`](super::motion::edge_cost); the heuristic is the Euclidean
//! distance between cell centers, scaled down only when the cost profile
//! allows edges cheaper than their geometric length.
//!
//! Bookkeeping lives in dense row-major arrays owned by one call. The
//! frontier is a binary heap of `Reverse((f, tie_a, tie_b, index))` keys,
//! so equal f-scores pop in the order given by [`TieBreak`].

use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::{debug, trace};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use super::motion::{edge_cost, CostProfile, MOTIONS};
use crate::common::{
    Endpoint, GridPathPlanner, PathResult, Position, RoutingError, RoutingResult, SearchOutcome,
};
use crate::mapping::{DensityConfig, DensityField};
use crate::utils::Grid;

/// Order among frontier entries with equal f-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// Lower row first, then lower column
    #[default]
    RowMajor,
    /// Lower column first, then lower row
    ColumnMajor,
    /// Earliest insertion first
    Fifo,
}

/// Configuration for the A* search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AStarConfig {
    pub tie_break: TieBreak,
    /// Give up with [`SearchOutcome::Aborted`] after this many expansions
    pub max_expansions: Option<usize>,
}

impl AStarConfig {
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if self.max_expansions == Some(0) {
            return Err(RoutingError::InvalidConfiguration(
                "expansion budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

type FrontierEntry = Reverse<(NotNan<f64>, u64, u64, usize)>;

/// Per-call g/f/predecessor arrays, indexed by [`Grid::index`]
struct SearchState {
    g: Vec<f64>,
    f: Vec<f64>,
    parent: Vec<Option<usize>>,
    closed: Vec<bool>,
    frontier: BinaryHeap<FrontierEntry>,
    explored: Vec<Position>,
    pushes: u64,
}

impl SearchState {
    fn new(cells: usize) -> Self {
        Self {
            g: vec![f64::INFINITY; cells],
            f: vec![f64::INFINITY; cells],
            parent: vec![None; cells],
            closed: vec![false; cells],
            frontier: BinaryHeap::new(),
            explored: Vec::new(),
            pushes: 0,
        }
    }
}

fn endpoint_index(grid: &Grid, endpoint: Endpoint, pos: Position) -> RoutingResult<usize> {
    let reason = match grid.index(pos) {
        None => format!("outside the {}x{} grid", grid.rows(), grid.cols()),
        Some(_) if !grid.is_traversable(pos) => "cell is an obstacle".to_string(),
        Some(index) => return Ok(index),
    };
    debug!("[AStar] rejected {} {}: {}", endpoint, pos, reason);
    Err(RoutingError::InvalidEndpoint {
        endpoint,
        position: pos,
        reason,
    })
}

/// Reject endpoints outside the grid or on an obstacle
///
/// Returns the row-major indices of start and goal.
pub fn validate_endpoints(
    grid: &Grid,
    start: Position,
    goal: Position,
) -> RoutingResult<(usize, usize)> {
    Ok((
        endpoint_index(grid, Endpoint::Start, start)?,
        endpoint_index(grid, Endpoint::Goal, goal)?,
    ))
}

/// A* planner over one grid snapshot and one cost profile
pub struct AStarPlanner<'a> {
    grid: &'a Grid,
    field: Cow<'a, DensityField>,
    profile: CostProfile,
    config: AStarConfig,
    heuristic_scale: f64,
}

impl<'a> AStarPlanner<'a> {
    /// Create a planner; the profile's field transform is applied here
    pub fn new(
        grid: &'a Grid,
        field: &'a DensityField,
        profile: CostProfile,
        config: AStarConfig,
    ) -> RoutingResult<Self> {
        config.validate()?;
        profile.validate()?;
        if (field.rows(), field.cols()) != (grid.rows(), grid.cols()) {
            return Err(RoutingError::InvalidConfiguration(format!(
                "density field is {}x{} but grid is {}x{}",
                field.rows(),
                field.cols(),
                grid.rows(),
                grid.cols()
            )));
        }

        let field = profile.apply(field);
        let heuristic_scale = profile.heuristic_scale(field.min_cost());
        Ok(Self {
            grid,
            field,
            profile,
            config,
            heuristic_scale,
        })
    }

    /// Planner with the unmodified field and default search settings
    pub fn with_defaults(grid: &'a Grid, field: &'a DensityField) -> RoutingResult<Self> {
        Self::new(grid, field, CostProfile::default(), AStarConfig::default())
    }

    /// Field after the profile transform
    pub fn field(&self) -> &DensityField {
        &self.field
    }

    pub fn profile(&self) -> &CostProfile {
        &self.profile
    }

    fn calc_heuristic(&self, from: Position, goal: Position) -> f64 {
        self.heuristic_scale * from.distance(&goal)
    }

    fn push(&self, state: &mut SearchState, index: usize, pos: Position) -> RoutingResult<()> {
        let f = NotNan::new(state.f[index]).map_err(|_| {
            RoutingError::InvalidConfiguration(format!("non-numeric path cost at {}", pos))
        })?;
        let (a, b) = match self.config.tie_break {
            TieBreak::RowMajor => (pos.row as u64, pos.col as u64),
            TieBreak::ColumnMajor => (pos.col as u64, pos.row as u64),
            TieBreak::Fifo => (state.pushes, 0),
        };
        state.pushes += 1;
        state.frontier.push(Reverse((f, a, b, index)));
        Ok(())
    }

    fn build_path(&self, goal_index: usize, state: &SearchState) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = Some(goal_index);

        while let Some(index) = current {
            path.push(self.grid.position(index));
            current = state.parent[index];
        }

        path.reverse();
        path
    }

    fn search(&self, start: Position, goal: Position) -> RoutingResult<PathResult> {
        trace!("[AStar] find_path: start={} goal={}", start, goal);

        let (start_index, goal_index) = validate_endpoints(self.grid, start, goal)?;

        let mut state = SearchState::new(self.grid.area());
        state.g[start_index] = 0.0;
        state.f[start_index] = self.calc_heuristic(start, goal);
        self.push(&mut state, start_index, start)?;

        let mut iterations = 0;
        while let Some(Reverse((_, _, _, current))) = state.frontier.pop() {
            iterations += 1;

            // Stale duplicate of an already finalized cell
            if state.closed[current] {
                continue;
            }

            if let Some(limit) = self.config.max_expansions {
                if state.explored.len() >= limit {
                    debug!(
                        "[AStar] ABORTED: expansion budget {} spent after {} iterations",
                        limit, iterations
                    );
                    return Ok(PathResult::failed(
                        SearchOutcome::Aborted,
                        state.explored,
                        iterations,
                    ));
                }
            }

            let current_pos = self.grid.position(current);
            state.closed[current] = true;
            state.explored.push(current_pos);

            if current == goal_index {
                let path = self.build_path(current, &state);
                let cost = state.g[current];
                trace!(
                    "[AStar] SUCCESS: {} waypoints, cost={:.3}, explored={}, iterations={}",
                    path.len(),
                    cost,
                    state.explored.len(),
                    iterations
                );
                return Ok(PathResult::found(path, cost, state.explored, iterations));
            }

            for &(dr, dc) in &MOTIONS {
                let next = current_pos.offset(dr, dc);
                let Some(next_index) = self.grid.index(next) else {
                    continue;
                };
                if state.closed[next_index] {
                    continue;
                }
                let Some(step) = edge_cost(self.grid, &self.field, &self.profile, current_pos, next)
                else {
                    continue;
                };

                let tentative_g = state.g[current] + step;
                if tentative_g < state.g[next_index] {
                    state.parent[next_index] = Some(current);
                    state.g[next_index] = tentative_g;
                    state.f[next_index] = tentative_g + self.calc_heuristic(next, goal);
                    self.push(&mut state, next_index, next)?;
                }
            }
        }

        debug!(
            "[AStar] UNREACHABLE: frontier exhausted after {} iterations, {} cells explored",
            iterations,
            state.explored.len()
        );
        Ok(PathResult::failed(
            SearchOutcome::Unreachable,
            state.explored,
            iterations,
        ))
    }
}

impl GridPathPlanner for AStarPlanner<'_> {
    fn plan(&self, start: Position, goal: Position) -> RoutingResult<PathResult> {
        self.search(start, goal)
    }
}

/// One-shot search that builds the density field from the grid's occupants
pub fn find_path(
    grid: &Grid,
    start: Position,
    goal: Position,
    density: &DensityConfig,
) -> RoutingResult<PathResult> {
    validate_endpoints(grid, start, goal)?;
    let field = DensityField::build(grid, density)?;
    AStarPlanner::with_defaults(grid, &field)?.plan(start, goal)
}
