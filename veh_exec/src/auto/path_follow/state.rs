//! # PathFollower state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of a follow, persisted between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathFollowState {
    /// Curve key of the goal, always in `[0, num_points)`.
    pub current_key: f64,

    /// The goal is advanced along the curve whenever the vehicle is closer to it than this.
    ///
    /// Units: world units
    pub distance_threshold: f64,

    /// Phase of the lateral weave.
    pub offset_time: f64,

    pub stuck: bool,

    /// Time spent near stationary while not yet stuck.
    ///
    /// Units: seconds
    pub time_stuck: f64,

    /// Point the vehicle is steering towards.
    pub goal: Vector3<f64>,

    /// Time since the follow started.
    ///
    /// Units: seconds
    pub elapsed: f64,

    /// Point on the curve `distance_threshold` behind the goal, the vehicle's nominal position.
    pub vehicle_on_path: Vector3<f64>,

    /// Lateral weave offset applied to the goal this tick.
    pub lateral_offset: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathFollowState {
    pub fn new(current_key: f64, distance_threshold: f64) -> Self {
        Self {
            current_key,
            distance_threshold,
            offset_time: 0.0,
            stuck: false,
            time_stuck: 0.0,
            goal: Vector3::zeros(),
            elapsed: 0.0,
            vehicle_on_path: Vector3::zeros(),
            lateral_offset: Vector3::zeros(),
        }
    }
}
