//! # ObstacleAvoider parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the [`ObstacleAvoider`](super::ObstacleAvoider).
#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleAvoidParams {
    /// Number of probes in the sweep, spaced evenly around the vehicle.
    pub raycast_count: usize,

    /// Length of each probe.
    ///
    /// Units: world units
    pub raycast_distance: f64,

    /// Height of the probes above the vehicle origin.
    ///
    /// Units: world units
    pub probe_height: f64,

    /// Time without any hit before avoidance is complete.
    ///
    /// Units: seconds
    pub clear_time_s: f64,

    /// Distance ahead of the vehicle of the avoidance goal.
    ///
    /// Units: world units
    pub goal_distance: f64,

    /// Yaw error to the avoidance goal which gives full steering.
    ///
    /// Units: degrees
    pub steering_angle_range_deg: f64,

    /// Throttle used to drive away from an obstacle in the forward half.
    pub forward_throttle: f64,

    /// Brake used to back away from an obstacle in the rear half.
    pub reverse_brake: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ObstacleAvoidParams {
    fn default() -> Self {
        Self {
            raycast_count: 16,
            raycast_distance: 300.0,
            probe_height: 20.0,
            clear_time_s: 0.5,
            goal_distance: 100.0,
            steering_angle_range_deg: 60.0,
            forward_throttle: 0.8,
            reverse_brake: 0.8,
        }
    }
}
