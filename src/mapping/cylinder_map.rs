//! Collision oracle for a polygon boundary with vertical cylinder obstacles

use itertools::Itertools;
use log::trace;
use nalgebra::Vector2;

use crate::common::{CollisionChecker, Cylinder, MapData, PlannerConfig, Position, SamplingBounds};
use crate::path_planning::fillet::Fillet;

/// Flyable area and obstacles of one mission
///
/// A line is clear when it stays inside the boundary polygon, keeps the
/// clearance from every boundary edge, and passes every cylinder either
/// horizontally or vertically. Altitude over a cylinder is judged from the
/// lowest end of the line.
#[derive(Debug, Clone)]
pub struct CylinderMap {
    boundary: Vec<Position>,
    cylinders: Vec<Cylinder>,
    bounds: Option<SamplingBounds>,
    arc_step: f64,
    after_wp_distance: f64,
    min_fly_height: f64,
    taking_off: bool,
}

impl CylinderMap {
    pub fn new(map: &MapData, config: &PlannerConfig) -> Self {
        let mut cylinder_map = CylinderMap {
            boundary: Vec::new(),
            cylinders: Vec::new(),
            bounds: None,
            arc_step: config.collision.arc_step,
            after_wp_distance: config.after_wp_distance(),
            min_fly_height: config.min_fly_height,
            taking_off: false,
        };
        cylinder_map.new_map(map);
        cylinder_map
    }

    pub fn cylinders(&self) -> &[Cylinder] {
        &self.cylinders
    }

    pub fn boundary(&self) -> &[Position] {
        &self.boundary
    }

    pub fn is_taking_off(&self) -> bool {
        self.taking_off
    }

    /// Point-in-polygon test on the north/east plane; no boundary means unbounded
    pub fn inside_boundary(&self, p: &Position) -> bool {
        if self.boundary.len() < 3 {
            return true;
        }
        let mut inside = false;
        for (a, b) in self.boundary.iter().circular_tuple_windows() {
            if (a.e > p.e) != (b.e > p.e) {
                let n_cross = a.n + (p.e - a.e) / (b.e - a.e) * (b.n - a.n);
                if p.n < n_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn clear_of_boundary(&self, p0: &Position, p1: &Position, clearance: f64) -> bool {
        if !self.inside_boundary(p0) || !self.inside_boundary(p1) {
            return false;
        }
        if self.boundary.len() < 3 {
            return true;
        }
        let (a, b) = (ne(p0), ne(p1));
        self.boundary
            .iter()
            .circular_tuple_windows()
            .all(|(c, d)| segment_distance(&a, &b, &ne(c), &ne(d)) >= clearance)
    }

    fn clear_of_cylinders(&self, p0: &Position, p1: &Position, clearance: f64) -> bool {
        let (a, b) = (ne(p0), ne(p1));
        let lowest = p0.altitude().min(p1.altitude());
        self.cylinders.iter().all(|cyl| {
            let center = Vector2::new(cyl.n, cyl.e);
            point_segment_distance(&center, &a, &b) >= cyl.radius + clearance
                || lowest >= cyl.height + clearance
        })
    }

    fn clear_of_ground(&self, p0: &Position, p1: &Position) -> bool {
        self.taking_off || p0.altitude().min(p1.altitude()) >= self.min_fly_height
    }
}

impl CollisionChecker for CylinderMap {
    fn check_line(&self, p0: &Position, p1: &Position, clearance: f64) -> bool {
        let clear = self.clear_of_ground(p0, p1)
            && self.clear_of_boundary(p0, p1, clearance)
            && self.clear_of_cylinders(p0, p1, clearance);
        if !clear {
            trace!(
                "line ({:.1}, {:.1}) -> ({:.1}, {:.1}) blocked",
                p0.n, p0.e, p1.n, p1.e
            );
        }
        clear
    }

    fn check_fillet(&self, fillet: &Fillet, clearance: f64) -> bool {
        fillet
            .arc_points(self.arc_step)
            .iter()
            .tuple_windows()
            .all(|(a, b)| self.check_line(a, b, clearance))
    }

    fn check_after_waypoint(&self, point: &Position, heading: f64, clearance: f64) -> bool {
        let ahead = Position::new(heading.cos(), heading.sin(), 0.0) * self.after_wp_distance;
        self.check_line(point, &(*point + ahead), clearance)
    }

    fn bounds(&self) -> Option<SamplingBounds> {
        self.bounds
    }

    fn new_map(&mut self, map: &MapData) {
        self.boundary = map.boundary.clone();
        self.cylinders = map.cylinders.clone();
        self.bounds = if map.boundary.len() < 3 {
            None
        } else {
            SamplingBounds::enclosing(&map.boundary)
        };
    }

    fn set_taking_off(&mut self, taking_off: bool) {
        self.taking_off = taking_off;
    }
}

fn ne(p: &Position) -> Vector2<f64> {
    Vector2::new(p.n, p.e)
}

fn point_segment_distance(p: &Vector2<f64>, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).max(0.0).min(1.0);
    (p - (a + ab * t)).norm()
}

fn cross(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

fn segments_intersect(a: &Vector2<f64>, b: &Vector2<f64>, c: &Vector2<f64>, d: &Vector2<f64>) -> bool {
    let d1 = cross(&(d - c), &(a - c));
    let d2 = cross(&(d - c), &(b - c));
    let d3 = cross(&(b - a), &(c - a));
    let d4 = cross(&(b - a), &(d - a));
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn segment_distance(a: &Vector2<f64>, b: &Vector2<f64>, c: &Vector2<f64>, d: &Vector2<f64>) -> f64 {
    if segments_intersect(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}
