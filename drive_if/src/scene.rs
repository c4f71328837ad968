//! # Scene queries
//!
//! Synchronous, bounded-cost line traces against the world.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Collision channel a trace is performed on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceChannel {
    /// Static world geometry, used for the stuck recovery probe.
    WorldStatic,

    /// Everything a vehicle must steer around, used by the obstacle sweep.
    VehicleAvoidance,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The first blocking hit of a line trace.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Distance from the trace start to the impact.
    ///
    /// Units: world units
    pub distance: f64,

    /// Point of impact in the world frame.
    pub impact_point: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A scene query service owned by one vehicle.
///
/// Traces shall ignore the vehicle performing the query.
pub trait SceneQuery {
    /// Trace a line from `start` to `end`, returning the nearest blocking hit if there is one.
    fn cast_ray(
        &self,
        start: Vector3<f64>,
        end: Vector3<f64>,
        channel: TraceChannel,
    ) -> Option<RayHit>;
}
