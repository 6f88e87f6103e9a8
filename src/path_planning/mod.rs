// Path Planning algorithms module

pub mod motion;
pub mod a_star;
pub mod multi_strategy;
pub mod smoothing;

pub use motion::*;
pub use a_star::*;
pub use multi_strategy::*;
pub use smoothing::*;
