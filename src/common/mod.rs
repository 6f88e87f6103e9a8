//! Common types, traits, and error definitions for crowd_routing
//!
//! This module provides the foundational building blocks shared by the
//! density field, the search engine and the post-processor.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
