//! # Drive telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use drive_if::task::TaskStatus;
use nalgebra::Vector3;
use serde::Serialize;

use super::DriveMode;
use crate::auto::{
    obstacle_avoid::ObstacleSensorResult, path_follow::PathFollowState,
    target_tracker::TrackerReport,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the drive manager after its latest step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DriveTm {
    pub mode: DriveMode,

    /// Status reported by the controller in charge on the last step.
    pub status: Option<TaskStatus>,

    pub follow: Option<PathFollowState>,

    pub obstacle: ObstacleSensorResult,

    pub tracker: TrackerReport,

    /// The most recent recovery waypoint.
    pub waypoint: Option<Vector3<f64>>,
}
