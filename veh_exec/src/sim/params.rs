//! # Simulation parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated world.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Period of one simulation cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Default duration of a run.
    ///
    /// Units: seconds
    pub duration_s: f64,

    /// Control points of the closed track, as `[x, y]` pairs.
    ///
    /// Units: world units
    pub track: Vec<[f64; 2]>,

    /// Actors within this distance of the vehicle are perceived.
    ///
    /// Units: world units
    pub perception_radius: f64,

    /// Time between perception updates.
    ///
    /// Units: seconds
    pub perception_period_s: f64,

    pub vehicle: VehicleParams,

    #[serde(default)]
    pub obstacles: Vec<ObstacleParams>,

    #[serde(default)]
    pub rivals: Vec<RivalParams>,
}

/// Kinematic model of the controlled vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleParams {
    /// Initial position as `[x, y]`.
    ///
    /// Units: world units
    pub start_position: [f64; 2],

    /// Units: degrees
    pub start_heading_deg: f64,

    /// Radius of the vehicle body used for collisions with obstacles.
    ///
    /// Units: world units
    pub body_radius: f64,

    /// World units per meter, used to convert speeds to world units per second.
    pub wu_per_m: f64,

    /// Units: kilometers/hour
    pub max_speed_kmh: f64,

    /// Units: kilometers/hour
    pub max_reverse_speed_kmh: f64,

    /// Acceleration at full throttle.
    ///
    /// Units: kilometers/hour/second
    pub max_accel_kmhs: f64,

    /// Deceleration at full brake, and reverse acceleration when braking from rest.
    ///
    /// Units: kilometers/hour/second
    pub max_brake_kmhs: f64,

    /// Deceleration with the handbrake engaged.
    ///
    /// Units: kilometers/hour/second
    pub handbrake_kmhs: f64,

    /// Speed lost per second per unit of speed.
    ///
    /// Units: 1/seconds
    pub drag_per_s: f64,

    /// Yaw rate at full steering once above `full_steer_speed_kmh`.
    ///
    /// Units: degrees/second
    pub max_yaw_rate_degs: f64,

    /// Below this speed the available yaw rate scales down linearly to zero.
    ///
    /// Units: kilometers/hour
    pub full_steer_speed_kmh: f64,
}

/// A static cylindrical obstacle.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ObstacleParams {
    /// Units: world units
    pub x: f64,

    /// Units: world units
    pub y: f64,

    /// Units: world units
    pub radius: f64,
}

/// A scripted rival vehicle driving the track at constant speed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RivalParams {
    pub id: u64,

    /// Distance along the track at which the rival starts.
    ///
    /// Units: world units
    pub start_distance: f64,

    /// Units: kilometers/hour
    pub speed_kmh: f64,

    /// Radius of the rival as seen by the obstacle sweep.
    ///
    /// Units: world units
    pub radius: f64,
}
