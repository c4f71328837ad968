//! # Vehicle state interface
//!
//! The world frame is right handed with Z up. Yaw (heading) is the angle of the body X (forward)
//! axis to the world +X axis, positive counter-clockwise when seen from above, in degrees.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifier of an actor in the world. Vehicles are actors too.
pub type ActorId = u64;

/// The pose (position and attitude in the world frame) of an actor.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pose {
    /// The position in the world frame.
    ///
    /// Units: world units
    pub position: Vector3<f64>,

    /// The attitude of the actor, rotating a vector from the body frame into the world frame.
    pub attitude_q: UnitQuaternion<f64>,
}

/// State of the controlled vehicle, provided by the simulation each tick.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VehicleState {
    /// Pose of the vehicle body.
    pub pose: Pose,

    /// Forward speed of the vehicle, negative when reversing.
    ///
    /// Units: kilometers/hour
    pub speed_kmh: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    /// Create a level pose at the given position with the given heading in degrees.
    pub fn from_heading_deg(position: Vector3<f64>, heading_deg: f64) -> Self {
        Self {
            position,
            attitude_q: UnitQuaternion::from_euler_angles(0.0, 0.0, heading_deg.to_radians()),
        }
    }

    /// Unit vector pointing along the body's forward (X) axis.
    pub fn forward(&self) -> Vector3<f64> {
        self.attitude_q * Vector3::new(1.0, 0.0, 0.0)
    }

    /// Unit vector pointing along the body's up (Z) axis.
    pub fn up(&self) -> Vector3<f64> {
        self.attitude_q * Vector3::new(0.0, 0.0, 1.0)
    }

    /// Unit vector pointing to the body's right, i.e. `forward × up`.
    pub fn right(&self) -> Vector3<f64> {
        self.attitude_q * Vector3::new(0.0, -1.0, 0.0)
    }

    /// Return the heading (yaw) of the body in degrees, in the range (-180, 180].
    pub fn heading_deg(&self) -> f64 {
        self.attitude_q.euler_angles().2.to_degrees()
    }
}

impl VehicleState {
    pub fn new(pose: Pose, speed_kmh: f64) -> Self {
        Self { pose, speed_kmh }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.pose.position
    }
}
