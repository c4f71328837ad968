//! # TargetTracker parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the [`TargetTracker`](super::TargetTracker).
#[derive(Debug, Clone, Deserialize)]
pub struct TargetTrackerParams {
    /// If false perception updates are stored but no target is ever tracked.
    pub use_avoidance: bool,

    /// Targets further away than this are dropped.
    ///
    /// Units: world units
    pub deacquire_distance: f64,

    /// Distance at which the steering modifier weight has ramped down to zero.
    ///
    /// Units: world units
    pub max_avoidance_distance: f64,

    /// Bearing error at which the steering modifier weight has ramped down to zero.
    ///
    /// Units: degrees
    pub max_avoidance_angle_delta_deg: f64,

    /// Steering modifier weight when the target is touching the vehicle.
    pub max_avoidance_weight: f64,

    /// The braking modifier is only applied above this speed.
    ///
    /// Units: kilometers/hour
    pub min_braking_speed_kmh: f64,

    /// Distance at which the braking modifier weight has ramped down to zero.
    ///
    /// Units: world units
    pub max_braking_distance: f64,

    /// Braking modifier weight when the target is touching the vehicle.
    pub max_braking_weight: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TargetTrackerParams {
    fn default() -> Self {
        Self {
            use_avoidance: true,
            deacquire_distance: 400.0,
            max_avoidance_distance: 400.0,
            max_avoidance_angle_delta_deg: 90.0,
            max_avoidance_weight: 0.6,
            min_braking_speed_kmh: 20.0,
            max_braking_distance: 300.0,
            max_braking_weight: 0.5,
        }
    }
}
