//! Observer that reports planner progress through the `log` facade

use std::collections::BTreeMap;

use log::{debug, info};

use crate::common::{PlannerObserver, Position, StartPose};
use crate::path_planning::forest::{Forest, NodeId};
use crate::path_planning::rrt::Rejection;

#[derive(Debug, Default, Clone)]
pub struct LoggingObserver {
    nodes_added: usize,
    rejections: BTreeMap<Rejection, usize>,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes_added(&self) -> usize {
        self.nodes_added
    }

    pub fn rejections(&self, reason: Rejection) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_rejections(&self) -> usize {
        self.rejections.values().sum()
    }
}

impl PlannerObserver for LoggingObserver {
    fn on_setup(&mut self, start: &StartPose, waypoints: &[Position]) {
        self.nodes_added = 0;
        self.rejections.clear();
        info!(
            "planning from ({:.1}, {:.1}, {:.1}) through {} waypoints",
            start.position.n,
            start.position.e,
            start.position.d,
            waypoints.len()
        );
    }

    fn on_node_added(&mut self, forest: &Forest, node: NodeId) {
        self.nodes_added += 1;
        debug!("{}", forest.describe(node));
    }

    fn on_edge_rejected(&mut self, _origin: &Position, _target: &Position, reason: Rejection) {
        *self.rejections.entry(reason).or_insert(0) += 1;
    }

    fn on_segment_solved(&mut self, segment: usize, path: &[Position]) {
        info!("segment {} solved with {} nodes", segment, path.len());
    }

    fn on_route_complete(&mut self, route: &[Position]) {
        info!(
            "route complete: {} points, {} nodes added, {} edges rejected",
            route.len(),
            self.nodes_added,
            self.total_rejections()
        );
        for (reason, count) in &self.rejections {
            debug!("  {}: {}", reason, count);
        }
    }
}
