//! RRT over a chain of waypoints with fillet turn constraints
//!
//! Waypoints are solved pairwise. Each segment first tries to join its root
//! straight (or through a single fillet) to the next waypoint; otherwise a
//! tree is grown from the root by random sampling until enough of its nodes
//! can see the waypoint. The cheapest connector is then taken as the parent of
//! the waypoint, which in turn becomes the root of the next segment, so the
//! whole route ends up as one tree.
//!
//! Every candidate edge goes through the same validator: line of sight, arc
//! clearance, room between consecutive fillets and clearance past the end
//! point along the new heading.

use std::fmt;

use log::{debug, info, trace};

use crate::common::{
    CollisionChecker, MapData, NullObserver, PlannerConfig, PlannerError, PlannerObserver,
    PlannerResult, Position, RandomSource, SamplingBounds, StartPose,
};
use crate::mapping::CylinderMap;
use crate::path_planning::fillet::Fillet;
use crate::path_planning::forest::{Forest, NewNode, NodeId};
use crate::path_planning::sampler::{sample_point, step_toward, SeededRandom};

/// Why a candidate edge was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    /// Placeholder origin without any grandchild to start from
    NoOrigin,
    LineBlocked,
    /// Fillet cannot be flown at the turn radius
    TurnInfeasible,
    ArcBlocked,
    /// New fillet overlaps the one flown at the parent
    NoRoomForTurn,
    AfterWaypointBlocked,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::NoOrigin => "no edge origin below placeholder",
            Rejection::LineBlocked => "line blocked",
            Rejection::TurnInfeasible => "turn infeasible",
            Rejection::ArcBlocked => "fillet arc blocked",
            Rejection::NoRoomForTurn => "no room between neighbouring fillets",
            Rejection::AfterWaypointBlocked => "blocked after end point",
        };
        f.write_str(text)
    }
}

/// Edge that passed every check, not yet committed to the forest
#[derive(Debug, Clone)]
pub struct AcceptedEdge {
    pub origin: NodeId,
    pub target: Position,
    pub fillet: Option<Fillet>,
    /// Cost at `target`
    pub cost: f64,
}

/// Path length at the end of an edge, crediting the distance cut by the fillet
pub fn edge_cost(origin_cost: f64, length: f64, adj: f64) -> f64 {
    origin_cost + length - adj
}

/// Multi-waypoint RRT planner
pub struct FilletRrt<C = CylinderMap, R = SeededRandom> {
    config: PlannerConfig,
    checker: C,
    rng: R,
    waypoints: Vec<Position>,
    forest: Forest,
    route: Vec<Position>,
    bounds: SamplingBounds,
    observer: Box<dyn PlannerObserver>,
}

impl FilletRrt<CylinderMap, SeededRandom> {
    /// Planner over a cylinder map with a seeded generator
    pub fn new(map: &MapData, config: PlannerConfig, seed: u64) -> Self {
        let mut checker = CylinderMap::new(map, &config);
        // TODO: drop the relaxation once the climb-out phase is planned separately
        checker.set_taking_off(true);
        Self::with_parts(checker, SeededRandom::new(seed), map.waypoints.clone(), config)
    }
}

impl<C: CollisionChecker, R: RandomSource> FilletRrt<C, R> {
    pub fn with_parts(checker: C, rng: R, waypoints: Vec<Position>, config: PlannerConfig) -> Self {
        FilletRrt {
            config,
            checker,
            rng,
            waypoints,
            forest: Forest::new(),
            route: Vec::new(),
            bounds: SamplingBounds::new(0.0, 0.0, 0.0, 0.0),
            observer: Box::new(NullObserver),
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn PlannerObserver>) {
        self.observer = observer;
    }

    pub fn new_map(&mut self, map: &MapData) {
        self.waypoints = map.waypoints.clone();
        self.checker.new_map(map);
    }

    pub fn new_seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Trees of the last solve
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Route of the last solve, start first
    pub fn route(&self) -> &[Position] {
        &self.route
    }

    /// Drop the forest and route of the last solve
    pub fn clear(&mut self) {
        self.route.clear();
        self.forest.clear();
    }

    /// Plan a route from `start` through every waypoint in order
    pub fn solve(&mut self, start: StartPose, direct_hit: bool) -> PlannerResult<Vec<Position>> {
        self.config.validate()?;
        if self.waypoints.is_empty() {
            return Err(PlannerError::NoWaypoints);
        }

        debug!("Starting RRT solver");
        self.clear();
        self.bounds = self.sampling_bounds(&start.position);
        self.initialize_forest(&start, direct_hit);
        self.log_setup(&start);
        self.observer.on_setup(&start, &self.waypoints);

        for segment in 0..self.waypoints.len() {
            debug!("Finding route to waypoint {}", segment + 1);
            let root = self.forest.roots()[segment];
            let placeholder = self.forest.get(root).map_or(false, |n| n.dont_connect());
            if placeholder && self.resolve_origin(root, &self.waypoints[segment]).is_none() {
                return Err(PlannerError::PlaceholderRoot { segment });
            }

            if !self.try_direct_connect(root, segment) {
                debug!("Developing the tree");
                let mut found = 0;
                let mut samples = 0;
                while found < self.config.num_paths {
                    if self.develop_tree(segment, &mut samples)? {
                        found += 1;
                    }
                }
                debug!(
                    "segment {} connected {} time(s) after {} samples",
                    segment, found, samples
                );
            }

            let rough_path = self.find_minimum_path(segment)?;
            let smooth_path = self.smooth_path(rough_path);
            self.add_path(&smooth_path);

            let positions: Vec<Position> = smooth_path.iter().map(|&id| self.forest.position(id)).collect();
            self.observer.on_segment_solved(segment, &positions);
        }

        info!(
            "route through {} waypoints: {} points, {} tree nodes",
            self.waypoints.len(),
            self.route.len(),
            self.forest.len()
        );
        self.observer.on_route_complete(&self.route);
        Ok(self.route.clone())
    }

    fn initialize_forest(&mut self, start: &StartPose, direct_hit: bool) {
        let below_min = start.position.altitude() < self.config.min_fly_height;
        let fan_start = self.config.fan_start_below_min_fly_height && below_min;
        if below_min {
            debug!("start is below the minimum fly height");
        }

        self.forest.add_root(start.position, fan_start);
        for wp in &self.waypoints {
            self.forest.add_root(*wp, direct_hit);
        }
        for (i, &root) in self.forest.roots().iter().enumerate() {
            let p = self.forest.position(root);
            debug!("Waypoint {}, North: {:.2}, East {:.2} Down: {:.2}", i, p.n, p.e, p.d);
        }
    }

    fn log_setup(&self, start: &StartPose) {
        let p = start.position;
        debug!(
            "Initial North: {:.2}, Initial East: {:.2}, Initial Down: {:.2}, Heading: {:.3}",
            p.n, p.e, p.d, start.heading
        );
        let bounds = self.bounds;
        debug!(
            "Sampling bounds: N [{:.1}, {:.1}], E [{:.1}, {:.1}]",
            bounds.min_n, bounds.max_n, bounds.min_e, bounds.max_e
        );
        debug!(
            "turn radius {:.1}, clearance {:.1}, step {:.1}",
            self.config.turn_radius, self.config.clearance, self.config.segment_length
        );
    }

    /// Region random points are drawn from
    ///
    /// An unbounded map samples the box around the start and the waypoints,
    /// grown by half its longer side and by at least one extension step.
    pub fn sampling_bounds(&self, start: &Position) -> SamplingBounds {
        if let Some(bounds) = self.checker.bounds() {
            return bounds;
        }
        let mut points = Vec::with_capacity(self.waypoints.len() + 1);
        points.push(*start);
        points.extend_from_slice(&self.waypoints);
        let around = SamplingBounds::enclosing(&points)
            .unwrap_or_else(|| SamplingBounds::new(start.n, start.n, start.e, start.e));
        around.padded((0.5 * around.extent()).max(self.config.segment_length))
    }

    /// Clearance required along segment `segment`
    pub fn clearance_for(&self, _segment: usize) -> f64 {
        self.config.clearance
    }

    /// Node edges towards `toward` actually start from
    ///
    /// Placeholders and their direct children are structural only, so the
    /// search moves down to the subtrees of the placeholder's grandchildren.
    pub fn resolve_origin(&self, candidate: NodeId, toward: &Position) -> Option<NodeId> {
        let node = self.forest.get(candidate)?;
        let placeholder = if node.dont_connect() {
            Some(candidate)
        } else {
            node.parent()
                .filter(|&parent| self.forest.get(parent).map_or(false, |p| p.dont_connect()))
        };
        match placeholder {
            Some(p) => self.forest.nearest_in_grandchildren(p, toward).map(|(id, _)| id),
            None => Some(candidate),
        }
    }

    /// Closest usable edge origin of the tree under `root`
    pub fn nearest_origin(&self, root: NodeId, p: &Position) -> Option<NodeId> {
        let (nearest, _) = self.forest.nearest(root, p);
        self.resolve_origin(nearest, p)
    }

    /// Run every feasibility check on the edge from `candidate` to `target`
    ///
    /// Nothing is modified; a rejected edge leaves no trace.
    pub fn validate_edge(&self, candidate: NodeId, target: Position, clearance: f64) -> Result<AcceptedEdge, Rejection> {
        let origin = self.resolve_origin(candidate, &target).ok_or(Rejection::NoOrigin)?;
        let node = self.forest.get(origin).ok_or(Rejection::NoOrigin)?;
        let start = node.position();

        if !self.checker.check_line(&start, &target, clearance) {
            return Err(Rejection::LineBlocked);
        }
        let length = (target - start).norm();

        let parent = match node.parent() {
            Some(parent) => parent,
            None => {
                if !self.checker.check_after_waypoint(&target, (target - start).heading(), clearance) {
                    return Err(Rejection::AfterWaypointBlocked);
                }
                return Ok(AcceptedEdge {
                    origin,
                    target,
                    fillet: None,
                    cost: edge_cost(node.cost(), length, 0.0),
                });
            }
        };

        let fillet = Fillet::calculate(self.forest.position(parent), start, target, self.config.turn_radius)
            .ok_or(Rejection::TurnInfeasible)?;
        if !self.checker.check_fillet(&fillet, clearance) {
            return Err(Rejection::ArcBlocked);
        }
        if self.forest.grandparent(origin).is_some() {
            if let Some(previous) = node.fillet() {
                if !previous.room_for(&fillet) {
                    trace!("{}", self.forest.describe(origin));
                    return Err(Rejection::NoRoomForTurn);
                }
            }
        }
        // the corner credit may not exceed the new leg, costs never decrease
        if fillet.adj > length {
            return Err(Rejection::TurnInfeasible);
        }
        if !self.checker.check_after_waypoint(&target, fillet.chi_out, clearance) {
            return Err(Rejection::AfterWaypointBlocked);
        }

        Ok(AcceptedEdge {
            origin,
            target,
            cost: edge_cost(node.cost(), length, fillet.adj),
            fillet: Some(fillet),
        })
    }

    /// Try to reach the destination waypoint of `segment` straight from `from`
    fn try_direct_connect(&mut self, from: NodeId, segment: usize) -> bool {
        let goal = self.forest.roots()[segment + 1];
        let target = self.forest.position(goal);
        let clearance = self.clearance_for(segment);
        let origin = self.resolve_origin(from, &target).unwrap_or(from);

        match self.validate_edge(origin, target, clearance) {
            Ok(edge) => {
                trace!("direct connection from {} at cost {:.2}", edge.origin, edge.cost);
                self.forest.mark_connector(edge.origin, edge.cost);
                true
            }
            Err(reason) => {
                trace!("direct connection from {} failed: {}", origin, reason);
                let start = self.forest.position(origin);
                self.observer.on_edge_rejected(&start, &target, reason);
                false
            }
        }
    }

    /// Grow the tree of `segment` by one node, then try to close on the waypoint
    ///
    /// Every sample counts against the segment budget; running out of it is
    /// reported as an infeasible segment.
    fn develop_tree(&mut self, segment: usize, samples: &mut usize) -> PlannerResult<bool> {
        let root = self.forest.roots()[segment];
        let altitude_d = self.waypoints[segment].d;
        let clearance = self.clearance_for(segment);

        let new_node = loop {
            if *samples >= self.config.max_samples_per_segment {
                return Err(PlannerError::InfeasibleSegment {
                    segment,
                    samples: *samples,
                });
            }
            *samples += 1;

            let bounds = self.bounds;
            let random_point = sample_point(&mut self.rng, &bounds, altitude_d);
            let closest = match self.nearest_origin(root, &random_point) {
                Some(id) => id,
                None => continue,
            };
            let start = self.forest.position(closest);
            let test_point = match step_toward(&start, &random_point, self.config.segment_length) {
                Some(p) => p,
                None => continue,
            };

            match self.validate_edge(closest, test_point, clearance) {
                Ok(edge) => break self.add_node(edge, segment),
                Err(reason) => {
                    trace!(
                        "rejected ({:.1}, {:.1}) -> ({:.1}, {:.1}): {}",
                        start.n, start.e, test_point.n, test_point.e, reason
                    );
                    self.observer.on_edge_rejected(&start, &test_point, reason);
                }
            }
        };

        debug!("added node {} after {} samples", new_node, samples);
        Ok(self.try_direct_connect(new_node, segment))
    }

    fn add_node(&mut self, edge: AcceptedEdge, segment: usize) -> NodeId {
        let reaches_waypoint = edge.target == self.waypoints[segment];
        let node = NewNode::new(edge.target, edge.cost)
            .with_fillet(edge.fillet)
            .reaching_waypoint(reaches_waypoint);
        let id = self.forest.add_child(edge.origin, node);
        self.observer.on_node_added(&self.forest, id);
        id
    }

    /// Hang the destination under the cheapest connector and return the
    /// segment's nodes from its root to the destination
    fn find_minimum_path(&mut self, segment: usize) -> PlannerResult<Vec<NodeId>> {
        let root = self.forest.roots()[segment];
        let goal = self.forest.roots()[segment + 1];
        let almost_last = self
            .forest
            .min_connector(root)
            .ok_or(PlannerError::Disconnected { segment })?;

        let fillet = self.forest.get(almost_last).and_then(|n| n.parent()).and_then(|parent| {
            Fillet::calculate(
                self.forest.position(parent),
                self.forest.position(almost_last),
                self.forest.position(goal),
                self.config.turn_radius,
            )
        });
        if !self.forest.attach(almost_last, goal, fillet) {
            return Err(PlannerError::Disconnected { segment });
        }

        let path = self
            .forest
            .path_between(root, goal)
            .ok_or(PlannerError::Disconnected { segment })?;
        debug!("segment {} path has {} nodes", segment, path.len());
        Ok(path)
    }

    /// Smoothing hook applied to every segment path before it joins the route
    pub fn smooth_path(&self, rough_path: Vec<NodeId>) -> Vec<NodeId> {
        rough_path
    }

    /// Append a segment path to the route; later segments start at the
    /// previous destination, which is already in the route
    fn add_path(&mut self, path: &[NodeId]) {
        let skip = if self.route.is_empty() { 0 } else { 1 };
        for &id in path.iter().skip(skip) {
            self.route.push(self.forest.position(id));
        }
    }
}
