// Obstacle maps and collision checking

pub mod cylinder_map;

pub use cylinder_map::*;
