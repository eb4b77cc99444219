//! Common types used throughout fillet_rrt

use std::ops::{Add, Mul, Sub};

use serde::Deserialize;

/// Position in a local North-East-Down frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Position {
    pub n: f64,
    pub e: f64,
    pub d: f64,
}

impl Position {
    pub fn new(n: f64, e: f64, d: f64) -> Self {
        Self { n, e, d }
    }

    pub fn origin() -> Self {
        Self { n: 0.0, e: 0.0, d: 0.0 }
    }

    /// Altitude above the local origin (positive up)
    pub fn altitude(&self) -> f64 {
        -self.d
    }

    pub fn norm(&self) -> f64 {
        (self.n * self.n + self.e * self.e + self.d * self.d).sqrt()
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (*other - *self).norm()
    }

    /// Unit vector in the same direction, `None` for the zero vector
    pub fn normalized(&self) -> Option<Position> {
        let len = self.norm();
        if len > 0.0 && len.is_finite() {
            Some(*self * (1.0 / len))
        } else {
            None
        }
    }

    pub fn dot(&self, other: &Position) -> f64 {
        self.n * other.n + self.e * other.e + self.d * other.d
    }

    /// Course angle of this vector, measured from north towards east
    pub fn heading(&self) -> f64 {
        self.e.atan2(self.n)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.n + rhs.n, self.e + rhs.e, self.d + rhs.d)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.n - rhs.n, self.e - rhs.e, self.d - rhs.d)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Position {
        Position::new(self.n * rhs, self.e * rhs, self.d * rhs)
    }
}

/// Vehicle pose at the start of a plan
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StartPose {
    pub position: Position,
    /// Initial course angle [rad]
    #[serde(default)]
    pub heading: f64,
}

impl StartPose {
    pub fn new(position: Position, heading: f64) -> Self {
        Self { position, heading }
    }
}

/// Vertical cylinder obstacle standing on the ground
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Cylinder {
    pub n: f64,
    pub e: f64,
    pub radius: f64,
    pub height: f64,
}

impl Cylinder {
    pub fn new(n: f64, e: f64, radius: f64, height: f64) -> Self {
        Self { n, e, radius, height }
    }
}

/// North/East rectangle the sampler draws from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingBounds {
    pub min_n: f64,
    pub max_n: f64,
    pub min_e: f64,
    pub max_e: f64,
}

impl SamplingBounds {
    pub fn new(min_n: f64, max_n: f64, min_e: f64, max_e: f64) -> Self {
        Self { min_n, max_n, min_e, max_e }
    }

    /// Bounding box of a set of points, `None` if the set is empty
    pub fn enclosing(points: &[Position]) -> Option<Self> {
        let first = points.first()?;
        let init = Self::new(first.n, first.n, first.e, first.e);
        Some(points.iter().fold(init, |b, p| Self {
            min_n: b.min_n.min(p.n),
            max_n: b.max_n.max(p.n),
            min_e: b.min_e.min(p.e),
            max_e: b.max_e.max(p.e),
        }))
    }

    /// Grow every side by `margin`
    pub fn padded(&self, margin: f64) -> Self {
        Self::new(
            self.min_n - margin,
            self.max_n + margin,
            self.min_e - margin,
            self.max_e + margin,
        )
    }

    /// Longer of the two sides
    pub fn extent(&self) -> f64 {
        (self.max_n - self.min_n).max(self.max_e - self.min_e)
    }
}

/// Mission map: flyable boundary, ordered waypoints and obstacles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub boundary: Vec<Position>,
    pub waypoints: Vec<Position>,
    #[serde(default)]
    pub cylinders: Vec<Cylinder>,
}

impl MapData {
    pub fn new(boundary: Vec<Position>, waypoints: Vec<Position>, cylinders: Vec<Cylinder>) -> Self {
        Self { boundary, waypoints, cylinders }
    }

    /// Axis-aligned square boundary centred on the origin
    pub fn square_boundary(half_width: f64) -> Vec<Position> {
        vec![
            Position::new(-half_width, -half_width, 0.0),
            Position::new(half_width, -half_width, 0.0),
            Position::new(half_width, half_width, 0.0),
            Position::new(-half_width, half_width, 0.0),
        ]
    }
}
