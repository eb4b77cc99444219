//! Utility modules for fillet_rrt

pub mod observer;
pub mod visualization;

pub use observer::LoggingObserver;
pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
