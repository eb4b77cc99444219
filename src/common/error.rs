//! Error types for fillet_rrt

use thiserror::Error;

/// Main error type for the planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The map holds no waypoint to plan towards
    #[error("Planning error: map has no waypoints")]
    NoWaypoints,

    /// The sample budget of one segment ran out before a path was found
    #[error("Planning error: no feasible extension for segment {segment} after {samples} samples")]
    InfeasibleSegment { segment: usize, samples: usize },

    /// A segment root is a placeholder without grandchildren to grow from
    #[error("Planning error: segment {segment} starts at a placeholder with no edge origins")]
    PlaceholderRoot { segment: usize },

    /// Path extraction could not walk from the destination back to the root
    #[error("Planning error: segment {segment} destination is not linked to its root")]
    Disconnected { segment: usize },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Scenario or configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
