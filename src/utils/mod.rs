//! Utility modules for crowd_routing

pub mod grid_map;

pub use grid_map::*;
