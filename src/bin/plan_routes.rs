// Multi-strategy route planning on a random crowd snapshot
//
// Usage: plan_routes [seed]
// Set RUST_LOG=debug to see per-strategy search diagnostics.

use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crowd_routing::{
    CellState, Grid, MultiStrategyPlanner, PathSmoother, PlannerConfig, Position, RoutingResult,
};

// Scenario parameters
const GRID_SIZE: usize = 50;
const NUM_PEOPLE: usize = 100;
const OBSTACLE_RATIO: f64 = 0.02;
const DEFAULT_SEED: u64 = 2024;

fn random_snapshot(rng: &mut StdRng, start: Position, goal: Position) -> RoutingResult<Grid> {
    let mut grid = Grid::square(GRID_SIZE)?;

    let num_obstacles = (GRID_SIZE as f64 * GRID_SIZE as f64 * OBSTACLE_RATIO) as usize;
    let mut placed = 0;
    while placed < num_obstacles {
        let pos = Position::new(
            rng.gen_range(0..GRID_SIZE as i32),
            rng.gen_range(0..GRID_SIZE as i32),
        );
        if pos != start && pos != goal && grid.get(pos) == Some(CellState::Empty) {
            grid.set(pos, CellState::Obstacle)?;
            placed += 1;
        }
    }

    let mut people = 0;
    while people < NUM_PEOPLE {
        let pos = Position::new(
            rng.gen_range(0..GRID_SIZE as i32),
            rng.gen_range(0..GRID_SIZE as i32),
        );
        if grid.get(pos) == Some(CellState::Empty) {
            grid.set(pos, CellState::Occupied)?;
            people += 1;
        }
    }

    Ok(grid)
}

fn run(seed: u64) -> RoutingResult<()> {
    let start = Position::new(0, 0);
    let goal = Position::new(GRID_SIZE as i32 - 1, GRID_SIZE as i32 - 1);

    let mut rng = StdRng::seed_from_u64(seed);
    let grid = random_snapshot(&mut rng, start, goal)?;
    info!(
        "snapshot {}x{} (seed {}): {} occupants",
        grid.rows(),
        grid.cols(),
        seed,
        grid.occupants().len()
    );

    let planner = MultiStrategyPlanner::new(PlannerConfig::default())?;
    let routes = planner.plan(&grid, start, goal)?;

    if routes.is_empty() {
        println!("No route from {} to {}", start, goal);
        return Ok(());
    }

    let smoother = PathSmoother::new(&grid);
    for route in &routes {
        let waypoints = smoother.smooth_result(&route.result);
        println!(
            "{:<16} cost {:>8.2}  cells {:>3}  explored {:>4}  smoothed waypoints {:>3}",
            route.name(),
            route.result.cost,
            route.result.len(),
            route.result.explored.len(),
            waypoints.len()
        );
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    println!("Crowd-aware route planning start!!");
    if let Err(e) = run(seed) {
        error!("planning failed: {}", e);
        std::process::exit(1);
    }
    println!("Crowd-aware route planning finish!!");
}
