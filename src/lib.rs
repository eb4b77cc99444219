//! fillet_rrt - RRT path planning through ordered waypoints
//!
//! Plans a route for a fixed-wing vehicle from a start pose through a list of
//! waypoints, growing one tree per waypoint pair and respecting a minimum
//! turn radius with fillet arcs at every corner.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Cylinder, MapData, Position, SamplingBounds, StartPose};
pub use common::{CollisionChecker, PlannerObserver, RandomSource};
pub use common::{PlannerConfig, Scenario};
pub use common::{PlannerError, PlannerResult};
pub use mapping::CylinderMap;
pub use path_planning::{Fillet, FilletRrt, Forest, NodeId, Rejection};
