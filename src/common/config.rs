//! Configuration loading for fillet_rrt

use std::path::Path;

use serde::Deserialize;

use crate::common::error::{PlannerError, PlannerResult};
use crate::common::types::{MapData, StartPose};

/// Parameters of the tree search
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    /// Minimum turn radius of the vehicle [m]
    #[serde(default = "default_turn_radius")]
    pub turn_radius: f64,

    /// Lowest altitude allowed outside of take-off [m]
    #[serde(default = "default_min_fly_height")]
    pub min_fly_height: f64,

    /// Distance every line and arc keeps from obstacles [m]
    #[serde(default = "default_clearance")]
    pub clearance: f64,

    /// Length of one tree extension step [m]
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,

    /// Waypoint connections to collect before extracting a segment path
    #[serde(default = "default_num_paths")]
    pub num_paths: usize,

    /// Samples drawn per segment before giving up
    #[serde(default = "default_max_samples")]
    pub max_samples_per_segment: usize,

    /// Mark the start root as a placeholder when starting below `min_fly_height`
    #[serde(default)]
    pub fan_start_below_min_fly_height: bool,

    #[serde(default)]
    pub collision: CollisionConfig,
}

/// Parameters of the cylinder collision oracle
#[derive(Clone, Debug, Deserialize)]
pub struct CollisionConfig {
    /// Angular step used to discretize fillet arcs [rad]
    #[serde(default = "default_arc_step")]
    pub arc_step: f64,

    /// Straight distance checked past a waypoint (turn radius when unset) [m]
    #[serde(default)]
    pub after_wp_distance: Option<f64>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            arc_step: default_arc_step(),
            after_wp_distance: None,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            turn_radius: default_turn_radius(),
            min_fly_height: default_min_fly_height(),
            clearance: default_clearance(),
            segment_length: default_segment_length(),
            num_paths: default_num_paths(),
            max_samples_per_segment: default_max_samples(),
            fan_start_below_min_fly_height: false,
            collision: CollisionConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Reject parameter combinations the search cannot work with
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.turn_radius >= 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "turn_radius must be non-negative, got {}",
                self.turn_radius
            )));
        }
        if !(self.clearance >= 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "clearance must be non-negative, got {}",
                self.clearance
            )));
        }
        if !(self.segment_length > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "segment_length must be positive, got {}",
                self.segment_length
            )));
        }
        if self.num_paths == 0 {
            return Err(PlannerError::InvalidParameter("num_paths must be at least 1".to_string()));
        }
        if self.max_samples_per_segment == 0 {
            return Err(PlannerError::InvalidParameter(
                "max_samples_per_segment must be at least 1".to_string(),
            ));
        }
        if !(self.collision.arc_step > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "collision.arc_step must be positive, got {}",
                self.collision.arc_step
            )));
        }
        Ok(())
    }

    /// Straight distance the oracle checks past every waypoint
    pub fn after_wp_distance(&self) -> f64 {
        self.collision
            .after_wp_distance
            .unwrap_or_else(|| self.turn_radius.max(1.0))
    }
}

/// Complete planning problem as stored on disk
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub direct_hit: bool,
    pub start: StartPose,
    pub map: MapData,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl Scenario {
    pub fn load(path: &Path) -> PlannerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlannerError::Config(format!("Failed to read scenario file: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> PlannerResult<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.planner.validate()?;
        Ok(scenario)
    }
}

// Default value functions
fn default_turn_radius() -> f64 {
    25.0
}
fn default_min_fly_height() -> f64 {
    30.0
}
fn default_clearance() -> f64 {
    5.0
}
fn default_segment_length() -> f64 {
    100.0
}
fn default_num_paths() -> usize {
    1
}
fn default_max_samples() -> usize {
    20_000
}
fn default_arc_step() -> f64 {
    0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PlannerConfig::default();
        assert_eq!(config.segment_length, 100.0);
        assert_eq!(config.num_paths, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_planner_table_matches_default() {
        let config: PlannerConfig = toml::from_str("").unwrap();
        let default = PlannerConfig::default();
        assert_eq!(config.turn_radius, default.turn_radius);
        assert_eq!(config.max_samples_per_segment, default.max_samples_per_segment);
        assert_eq!(config.collision.arc_step, default.collision.arc_step);
    }

    #[test]
    fn test_after_wp_distance_falls_back_to_turn_radius() {
        let mut config = PlannerConfig::default();
        assert_eq!(config.after_wp_distance(), 25.0);
        config.turn_radius = 0.0;
        assert_eq!(config.after_wp_distance(), 1.0);
        config.collision.after_wp_distance = Some(40.0);
        assert_eq!(config.after_wp_distance(), 40.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PlannerConfig::default();
        config.segment_length = 0.0;
        assert!(matches!(config.validate(), Err(PlannerError::InvalidParameter(_))));

        let mut config = PlannerConfig::default();
        config.num_paths = 0;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.turn_radius = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scenario_from_toml() {
        let text = r#"
            seed = 7
            direct_hit = false

            [start]
            heading = 0.5
            position = { n = 0.0, e = 0.0, d = -50.0 }

            [map]
            boundary = [
                { n = -500.0, e = -500.0, d = 0.0 },
                { n = 500.0, e = -500.0, d = 0.0 },
                { n = 500.0, e = 500.0, d = 0.0 },
                { n = -500.0, e = 500.0, d = 0.0 },
            ]
            waypoints = [{ n = 300.0, e = 0.0, d = -50.0 }]
            cylinders = [{ n = 150.0, e = 0.0, radius = 30.0, height = 100.0 }]

            [planner]
            turn_radius = 10.0
        "#;
        let scenario = Scenario::from_toml(text).unwrap();
        assert_eq!(scenario.seed, 7);
        assert_eq!(scenario.map.waypoints.len(), 1);
        assert_eq!(scenario.map.cylinders[0].radius, 30.0);
        assert_eq!(scenario.planner.turn_radius, 10.0);
        assert_eq!(scenario.planner.clearance, 5.0);
    }

    #[test]
    fn test_scenario_rejects_invalid_planner() {
        let text = r#"
            [start]
            position = { n = 0.0, e = 0.0, d = -50.0 }
            [map]
            waypoints = []
            [planner]
            segment_length = -1.0
        "#;
        assert!(Scenario::from_toml(text).is_err());
    }
}
