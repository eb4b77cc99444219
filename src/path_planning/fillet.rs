//! Fillet turn geometry
//!
//! A fillet replaces the corner at `w` of the polyline `w_prev -> w -> w_next`
//! with a circular arc of fixed radius tangent to both legs. The vehicle
//! leaves the first leg at `z1`, flies the arc around `center` and joins the
//! second leg at `z2`.

use std::f64::consts::PI;

use crate::common::Position;

/// Turn below this angle [rad] is treated as flying straight through
const STRAIGHT_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fillet {
    pub w_prev: Position,
    pub w: Position,
    pub w_next: Position,
    /// Unit direction of the incoming leg
    pub q_in: Position,
    /// Unit direction of the outgoing leg
    pub q_out: Position,
    /// Entry tangent point on the incoming leg
    pub z1: Position,
    /// Exit tangent point on the outgoing leg
    pub z2: Position,
    pub center: Position,
    pub radius: f64,
    pub chi_in: f64,
    pub chi_out: f64,
    /// Heading change [rad], 0 for a straight pass
    pub turn_angle: f64,
    /// Length saved against flying both legs through the corner
    pub adj: f64,
    /// Right-hand turn seen from above
    pub clockwise: bool,
}

impl Fillet {
    /// Solve the fillet at `w`, `None` if the turn does not fit the legs
    pub fn calculate(w_prev: Position, w: Position, w_next: Position, radius: f64) -> Option<Fillet> {
        let q_in = (w - w_prev).normalized()?;
        let q_out = (w_next - w).normalized()?;

        // angle enclosed between the two legs: PI when straight, 0 when reversing
        let varrho = (-q_in.dot(&q_out)).max(-1.0).min(1.0).acos();
        let turn_angle = PI - varrho;
        let clockwise = q_in.n * q_out.e - q_in.e * q_out.n > 0.0;

        let mut fillet = Fillet {
            w_prev,
            w,
            w_next,
            q_in,
            q_out,
            z1: w,
            z2: w,
            center: w,
            radius,
            chi_in: q_in.heading(),
            chi_out: q_out.heading(),
            turn_angle,
            adj: 0.0,
            clockwise,
        };

        if radius == 0.0 || turn_angle < STRAIGHT_EPS {
            return Some(fillet);
        }
        if varrho < STRAIGHT_EPS {
            return None;
        }

        let tangent = radius / (varrho / 2.0).tan();
        if tangent > (w - w_prev).norm() || tangent > (w_next - w).norm() {
            return None;
        }
        let bisector = (q_in - q_out).normalized()?;

        fillet.z1 = w - q_in * tangent;
        fillet.z2 = w + q_out * tangent;
        fillet.center = w - bisector * (radius / (varrho / 2.0).sin());
        fillet.adj = 2.0 * tangent - radius * turn_angle;
        Some(fillet)
    }

    /// Distance from the corner to either tangent point
    pub fn tangent_length(&self) -> f64 {
        (self.z2 - self.w).norm()
    }

    pub fn arc_length(&self) -> f64 {
        self.radius * self.turn_angle
    }

    /// Whether `next`, the fillet at `w_next`, fits on the shared leg without
    /// its arc starting before this one ends
    pub fn room_for(&self, next: &Fillet) -> bool {
        let leg = (self.w_next - self.w).norm();
        (self.z2 - self.w).norm() + (next.w - next.z1).norm() <= leg
    }

    /// Points along the arc from `z1` to `z2`, at most `step` radians apart
    pub fn arc_points(&self, step: f64) -> Vec<Position> {
        if self.radius == 0.0 || self.turn_angle < STRAIGHT_EPS {
            return vec![self.z1, self.z2];
        }

        let start = (self.z1.e - self.center.e).atan2(self.z1.n - self.center.n);
        let end = (self.z2.e - self.center.e).atan2(self.z2.n - self.center.n);
        let mut sweep = end - start;
        if sweep > PI {
            sweep -= 2.0 * PI;
        } else if sweep < -PI {
            sweep += 2.0 * PI;
        }

        let n_steps = ((sweep.abs() / step).ceil() as usize).max(1);
        (0..=n_steps)
            .map(|i| {
                let f = i as f64 / n_steps as f64;
                let a = start + sweep * f;
                Position::new(
                    self.center.n + self.radius * a.cos(),
                    self.center.e + self.radius * a.sin(),
                    self.z1.d + (self.z2.d - self.z1.d) * f,
                )
            })
            .collect()
    }
}
