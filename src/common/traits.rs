//! Common traits defining the seams between the planner and its collaborators

use crate::common::types::*;
use crate::path_planning::fillet::Fillet;
use crate::path_planning::forest::{Forest, NodeId};
use crate::path_planning::rrt::Rejection;

/// Obstacle oracle queried by the edge validator
///
/// Every query is side-effect free; `true` means the geometry keeps at least
/// `clearance` from every obstacle.
pub trait CollisionChecker {
    /// Straight segment from `p0` to `p1`
    fn check_line(&self, p0: &Position, p1: &Position, clearance: f64) -> bool;

    /// Circular arc of a fillet, from its entry to its exit tangent point
    fn check_fillet(&self, fillet: &Fillet, clearance: f64) -> bool;

    /// Room to keep flying past `point` along `heading`
    fn check_after_waypoint(&self, point: &Position, heading: f64, clearance: f64) -> bool;

    /// Region the sampler draws from, `None` for an unbounded map
    fn bounds(&self) -> Option<SamplingBounds>;

    /// Replace the obstacle state with a new map
    fn new_map(&mut self, map: &MapData);

    /// Relax ground proximity checks while climbing out
    fn set_taking_off(&mut self, taking_off: bool);
}

/// Seeded uniform number source owned by one planner
pub trait RandomSource {
    /// Restart the sequence from `seed`
    fn reseed(&mut self, seed: u64);

    /// Uniform value in `[0, 1)`
    fn uniform(&mut self) -> f64;
}

/// Port for publishing planner progress (logging, plotting, telemetry)
///
/// All methods default to doing nothing.
pub trait PlannerObserver {
    fn on_setup(&mut self, _start: &StartPose, _waypoints: &[Position]) {}

    fn on_node_added(&mut self, _forest: &Forest, _node: NodeId) {}

    fn on_edge_rejected(&mut self, _origin: &Position, _target: &Position, _reason: Rejection) {}

    fn on_segment_solved(&mut self, _segment: usize, _path: &[Position]) {}

    fn on_route_complete(&mut self, _route: &[Position]) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PlannerObserver for NullObserver {}
