//! Forest of search trees stored in a single index arena
//!
//! One root exists per waypoint plus one for the start pose. Nodes own their
//! children by index; parents are plain back-references used for geometry
//! lookups and cost chains. The whole arena is dropped at once, so teardown
//! frees every node exactly once without a traversal.

use std::fmt;

use crate::common::Position;
use crate::path_planning::fillet::Fillet;

/// Stable handle of a node inside a [`Forest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) p: Position,
    pub(crate) fillet: Option<Fillet>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cost: f64,
    pub(crate) dont_connect: bool,
    pub(crate) connects_to_waypoint: bool,
    pub(crate) arrival_cost: Option<f64>,
}

impl Node {
    fn root(p: Position, dont_connect: bool) -> Self {
        Node {
            p,
            fillet: None,
            parent: None,
            children: Vec::new(),
            cost: 0.0,
            dont_connect,
            connects_to_waypoint: false,
            arrival_cost: None,
        }
    }

    pub fn position(&self) -> Position {
        self.p
    }

    /// Turn flown at the parent to head into this node
    pub fn fillet(&self) -> Option<&Fillet> {
        self.fillet.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Path length from the segment root
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Structural placeholder: edges never start here directly
    pub fn dont_connect(&self) -> bool {
        self.dont_connect
    }

    pub fn connects_to_waypoint(&self) -> bool {
        self.connects_to_waypoint
    }

    /// Path length at the active waypoint when reached through this node
    pub fn arrival_cost(&self) -> Option<f64> {
        self.arrival_cost
    }
}

/// Description of a node to insert under an existing parent
#[derive(Debug, Clone)]
pub struct NewNode {
    pub p: Position,
    pub fillet: Option<Fillet>,
    pub cost: f64,
    pub dont_connect: bool,
    pub connects_to_waypoint: bool,
}

impl NewNode {
    pub fn new(p: Position, cost: f64) -> Self {
        Self {
            p,
            fillet: None,
            cost,
            dont_connect: false,
            connects_to_waypoint: false,
        }
    }

    pub fn with_fillet(mut self, fillet: Option<Fillet>) -> Self {
        self.fillet = fillet;
        self
    }

    pub fn placeholder(mut self) -> Self {
        self.dont_connect = true;
        self
    }

    pub fn reaching_waypoint(mut self, reaches: bool) -> Self {
        self.connects_to_waypoint = reaches;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node and root; a no-op on an empty forest
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn position(&self, id: NodeId) -> Position {
        self.nodes[id.0].p
    }

    pub fn add_root(&mut self, p: Position, dont_connect: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::root(p, dont_connect));
        self.roots.push(id);
        id
    }

    /// Allocate a node owned by `parent`
    pub fn add_child(&mut self, parent: NodeId, node: NewNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        let arrival_cost = if node.connects_to_waypoint { Some(node.cost) } else { None };
        self.nodes.push(Node {
            p: node.p,
            fillet: node.fillet,
            parent: Some(parent),
            children: Vec::new(),
            cost: node.cost,
            dont_connect: node.dont_connect,
            connects_to_waypoint: node.connects_to_waypoint,
            arrival_cost,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Record that the active waypoint is reachable from `id` at `arrival_cost`
    pub fn mark_connector(&mut self, id: NodeId, arrival_cost: f64) {
        let node = &mut self.nodes[id.0];
        node.connects_to_waypoint = true;
        node.arrival_cost = Some(arrival_cost);
    }

    /// Hang the parentless node `child` under `parent`
    ///
    /// Returns `false` and changes nothing if `child` already has a parent or
    /// if the link would close a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId, fillet: Option<Fillet>) -> bool {
        if self.nodes[child.0].parent.is_some() || self.is_ancestor(child, parent) {
            return false;
        }
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.fillet = fillet;
        self.nodes[parent.0].children.push(child);
        true
    }

    /// Whether `ancestor` lies on the parent chain of `id` (or is `id`)
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes[c.0].parent;
        }
        false
    }

    pub fn grandparent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent.and_then(|p| self.nodes[p.0].parent)
    }

    /// Pre-order walk of the subtree under `root`, children in insertion order
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }

    /// Closest node below `root`; the first found wins ties
    ///
    /// The root itself is only measured while it has no children, so an
    /// extended tree never grows from its root again.
    pub fn nearest(&self, root: NodeId, p: &Position) -> (NodeId, f64) {
        if self.nodes[root.0].children.is_empty() {
            return (root, self.nodes[root.0].p.distance(p));
        }
        self.nearest_from(root, p, false)
    }

    /// Closest node among the subtrees of the grandchildren of `id`,
    /// grandchildren included
    pub fn nearest_in_grandchildren(&self, id: NodeId, p: &Position) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.nodes[id.0].children {
            for &grandchild in &self.nodes[child.0].children {
                let candidate = self.nearest_from(grandchild, p, true);
                if best.map_or(true, |(_, d)| candidate.1 < d) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn nearest_from(&self, start: NodeId, p: &Position, include_start: bool) -> (NodeId, f64) {
        let skip = if include_start { 0 } else { 1 };
        let mut best = (start, f64::INFINITY);
        for id in self.subtree(start).into_iter().skip(skip) {
            let d = self.nodes[id.0].p.distance(p);
            if d < best.1 {
                best = (id, d);
            }
        }
        best
    }

    /// Cheapest waypoint connector under `root`
    ///
    /// Connectors are not descended into. Equal costs resolve to the one
    /// visited last.
    pub fn min_connector(&self, root: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.connects_to_waypoint {
                let cost = node.arrival_cost.unwrap_or(node.cost);
                if best.map_or(true, |(_, c)| cost <= c) {
                    best = Some((id, cost));
                }
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        best.map(|(id, _)| id)
    }

    /// Nodes from `from` up to and including `to`, in root-to-leaf order
    ///
    /// `None` if `to` is not an ancestor of `from`.
    pub fn path_between(&self, to: NodeId, from: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![from];
        let mut current = from;
        while current != to {
            current = self.nodes[current.0].parent?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Multi-line dump of one node for diagnostics
    pub fn describe(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        let mut out = format!(
            "node {}: p=({:.2}, {:.2}, {:.2}) cost={:.2} parent={:?} children={} dont_connect={} connects_to_waypoint={}",
            id,
            node.p.n,
            node.p.e,
            node.p.d,
            node.cost,
            node.parent,
            node.children.len(),
            node.dont_connect,
            node.connects_to_waypoint,
        );
        if let Some(fil) = &node.fillet {
            out.push_str(&format!(
                "\n  fillet: z1=({:.2}, {:.2}) z2=({:.2}, {:.2}) c=({:.2}, {:.2}) R={:.2} adj={:.3}",
                fil.z1.n, fil.z1.e, fil.z2.n, fil.z2.e, fil.center.n, fil.center.e, fil.radius, fil.adj
            ));
        }
        out
    }
}
