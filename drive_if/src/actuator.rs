//! # Actuator demands
//!
//! The controllers write their demands into an [`ActuatorSink`]. The simulation (or any other
//! vehicle movement implementation) owns the sink and applies it at the end of the tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::{clamp, lerp};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Destination for actuator demands.
///
/// Implementations shall saturate all values into their valid ranges: steering in `[-1, 1]`,
/// throttle, brake and modifier weights in `[0, 1]`.
pub trait ActuatorSink {
    /// Set the steering demand. Positive steering turns counter-clockwise (to the left).
    fn set_steering(&mut self, value: f64);

    fn set_throttle_and_brake(&mut self, throttle: f64, brake: f64);

    fn set_handbrake(&mut self, engaged: bool);

    /// Bias the baseline steering towards `value` with the given weight.
    fn set_steering_modifier(&mut self, value: f64, weight: f64);

    /// Bias the baseline throttle towards `value` with the given weight.
    fn set_throttle_modifier(&mut self, value: f64, weight: f64);

    /// Bias the baseline brake towards `value` with the given weight.
    fn set_braking_modifier(&mut self, value: f64, weight: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A `(value, weight)` pair which biases a baseline command rather than replacing it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub value: f64,

    /// Weight of the modifier, in `[0, 1]`. A zero weight leaves the baseline untouched.
    pub weight: f64,
}

/// The full set of actuator demands for one vehicle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Steering demand in `[-1, 1]`.
    pub steering: f64,

    /// Throttle demand in `[0, 1]`.
    pub throttle: f64,

    /// Brake demand in `[0, 1]`.
    pub brake: f64,

    pub handbrake: bool,

    pub steering_modifier: Modifier,
    pub throttle_modifier: Modifier,
    pub braking_modifier: Modifier,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Modifier {
    pub fn new(value: f64, weight: f64) -> Self {
        Self {
            value,
            weight: clamp(&weight, &0.0, &1.0),
        }
    }

    /// Apply the modifier to a baseline value.
    pub fn apply(&self, base: f64) -> f64 {
        lerp(base, self.value, self.weight)
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0 && self.weight == 0.0
    }
}

impl ActuatorCommand {
    /// Steering after the steering modifier has been applied.
    pub fn effective_steering(&self) -> f64 {
        clamp(&self.steering_modifier.apply(self.steering), &-1.0, &1.0)
    }

    /// Throttle after the throttle modifier has been applied.
    pub fn effective_throttle(&self) -> f64 {
        clamp(&self.throttle_modifier.apply(self.throttle), &0.0, &1.0)
    }

    /// Brake after the braking modifier has been applied.
    pub fn effective_brake(&self) -> f64 {
        clamp(&self.braking_modifier.apply(self.brake), &0.0, &1.0)
    }
}

impl ActuatorSink for ActuatorCommand {
    fn set_steering(&mut self, value: f64) {
        self.steering = saturate(value, -1.0, 1.0);
    }

    fn set_throttle_and_brake(&mut self, throttle: f64, brake: f64) {
        self.throttle = saturate(throttle, 0.0, 1.0);
        self.brake = saturate(brake, 0.0, 1.0);
    }

    fn set_handbrake(&mut self, engaged: bool) {
        self.handbrake = engaged;
    }

    fn set_steering_modifier(&mut self, value: f64, weight: f64) {
        self.steering_modifier = Modifier::new(saturate(value, -1.0, 1.0), weight);
    }

    fn set_throttle_modifier(&mut self, value: f64, weight: f64) {
        self.throttle_modifier = Modifier::new(saturate(value, 0.0, 1.0), weight);
    }

    fn set_braking_modifier(&mut self, value: f64, weight: f64) {
        self.braking_modifier = Modifier::new(saturate(value, 0.0, 1.0), weight);
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Clamp a demand into its range, mapping NaN to zero so it can never reach the actuators.
fn saturate(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        log::warn!("NaN actuator demand replaced with 0");
        0.0
    } else {
        clamp(&value, &min, &max)
    }
}
