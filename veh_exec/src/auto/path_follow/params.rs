//! # PathFollower parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::auto::lut::Lut;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the [`PathFollower`](super::PathFollower).
#[derive(Debug, Clone, Deserialize)]
pub struct PathFollowParams {
    /// Goal distance threshold at the start of a follow, decaying towards the speed dependent
    /// threshold during the startup phase.
    ///
    /// Units: world units
    pub start_distance_threshold: f64,

    /// Duration of the startup phase.
    ///
    /// Units: seconds
    pub startup_duration_s: f64,

    /// Rate at which the goal threshold shrinks during startup.
    ///
    /// Units: world units/second
    pub startup_threshold_rate: f64,

    /// Interpolation speed of the goal threshold after startup.
    ///
    /// Units: 1/seconds
    pub threshold_interp_speed: f64,

    /// Vehicle speeds mapped onto `goal_distance_range` and `lookahead_key_range`.
    ///
    /// Units: kilometers/hour
    pub speed_range_kmh: [f64; 2],

    /// Goal distance threshold at either end of `speed_range_kmh`.
    ///
    /// Units: world units
    pub goal_distance_range: [f64; 2],

    /// Curve key advanced per second whenever the goal is within the threshold.
    pub key_rate: f64,

    /// Speed divisor for the speed dependent part of the goal advance, in km/h per key.
    pub key_speed_divisor_kmh: f64,

    /// Amplitude of the lateral weave around the curve.
    ///
    /// Units: world units
    pub weave_amplitude: f64,

    /// Weave phase advanced per second.
    ///
    /// Units: radians/second
    pub weave_rate: f64,

    /// Yaw error which gives full steering.
    ///
    /// Units: degrees
    pub steering_range_deg: f64,

    /// Curve key lookahead at either end of `speed_range_kmh`, for the curve braking.
    pub lookahead_key_range: [f64; 2],

    /// Excess speed over the curve's maximum which gives full brake.
    ///
    /// Units: kilometers/hour
    pub brake_speed_range_kmh: f64,

    /// Speeds strictly within `(-stuck_speed_kmh, stuck_speed_kmh)` count towards being stuck.
    ///
    /// Units: kilometers/hour
    pub stuck_speed_kmh: f64,

    /// Time the vehicle must be near stationary before it is considered stuck.
    ///
    /// Units: seconds
    pub stuck_time_s: f64,

    /// Brake held while stuck.
    pub stuck_brake: f64,

    /// Height above the vehicle origin of the recovery probe.
    ///
    /// Units: world units
    pub probe_height: f64,

    /// Length of the forward recovery probe.
    ///
    /// Units: world units
    pub probe_length: f64,

    /// Maximum throttle against distance from the vehicle to its point on the curve.
    pub throttle_by_path_distance: Lut,

    /// Maximum speed (km/h) against alignment of the vehicle forward vector with the curve
    /// direction ahead, in `[-1, 1]`.
    pub max_speed_by_alignment: Lut,
}

/// Driving personality of an agent.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DriveStyle {
    /// Added to the maximum cornering speed. Negative values give a cautious driver.
    ///
    /// Units: kilometers/hour
    pub max_speed_delta_kmh: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PathFollowParams {
    fn default() -> Self {
        Self {
            start_distance_threshold: 1000.0,
            startup_duration_s: 5.0,
            startup_threshold_rate: 150.0,
            threshold_interp_speed: 8.0,
            speed_range_kmh: [10.0, 60.0],
            goal_distance_range: [100.0, 1000.0],
            key_rate: 2.0,
            key_speed_divisor_kmh: 1200.0,
            weave_amplitude: 100.0,
            weave_rate: 0.25,
            steering_range_deg: 90.0,
            lookahead_key_range: [0.1, 0.5],
            brake_speed_range_kmh: 40.0,
            stuck_speed_kmh: 1.0,
            stuck_time_s: 1.5,
            stuck_brake: 0.5,
            probe_height: 20.0,
            probe_length: 150.0,
            throttle_by_path_distance: Lut::constant(1.0),
            max_speed_by_alignment: Lut::constant(120.0),
        }
    }
}
