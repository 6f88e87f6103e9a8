// Mapping module: cost fields derived from a grid snapshot

pub mod density_field;

pub use density_field::*;
