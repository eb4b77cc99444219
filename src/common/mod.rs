//! Common types, traits, configuration and error definitions for fillet_rrt
//!
//! This module provides the foundational building blocks shared by the
//! collision oracle, the planner and the visualization utilities.

pub mod types;
pub mod traits;
pub mod error;
pub mod config;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use config::*;
