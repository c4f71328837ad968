//! # Simulated vehicle
//!
//! A kinematic model: throttle and brake change the speed directly, steering changes the yaw
//! rate, and there is no slip. Braking from rest reverses the vehicle, which is what lets the
//! controllers back away from obstacles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use drive_if::{
    actuator::ActuatorCommand,
    vehicle::{Pose, VehicleState},
};
use nalgebra::Vector3;
use util::maths::{clamp, norm_angle_deg, sign};

use super::params::VehicleParams;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Forward speeds below this count as being at rest.
const REST_SPEED_KMH: f64 = 0.5;

/// Seconds per hour over meters per kilometer.
const KMH_PER_MS: f64 = 3.6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimVehicle {
    params: VehicleParams,

    position: Vector3<f64>,

    heading_deg: f64,

    speed_kmh: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimVehicle {
    pub fn new(params: VehicleParams) -> Self {
        Self {
            position: Vector3::new(params.start_position[0], params.start_position[1], 0.0),
            heading_deg: params.start_heading_deg,
            speed_kmh: 0.0,
            params,
        }
    }

    pub fn state(&self) -> VehicleState {
        VehicleState::new(
            Pose::from_heading_deg(self.position, self.heading_deg),
            self.speed_kmh,
        )
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn body_radius(&self) -> f64 {
        self.params.body_radius
    }

    /// Apply the actuator demands for `dt` seconds.
    ///
    /// If the new position is rejected by `blocked` the vehicle stays where it is and stops.
    pub fn step<F>(&mut self, dt: f64, cmd: &ActuatorCommand, blocked: F)
    where
        F: Fn(&Vector3<f64>) -> bool,
    {
        let p = &self.params;

        let throttle = cmd.effective_throttle();
        let brake = cmd.effective_brake();
        let steering = cmd.effective_steering();

        if cmd.handbrake {
            let decel = p.handbrake_kmhs * dt;
            self.speed_kmh = if self.speed_kmh.abs() <= decel {
                0.0
            } else {
                self.speed_kmh - sign(self.speed_kmh) * decel
            };
        } else {
            let mut accel = throttle * p.max_accel_kmhs - p.drag_per_s * self.speed_kmh;

            // Brake slows forward motion, or reverses when there is no throttle
            if self.speed_kmh > REST_SPEED_KMH || throttle <= 0.0 {
                accel -= brake * p.max_brake_kmhs;
            }

            self.speed_kmh += accel * dt;
        }

        self.speed_kmh = clamp(
            &self.speed_kmh,
            &-p.max_reverse_speed_kmh,
            &p.max_speed_kmh,
        );

        let steer_authority = clamp(
            &(self.speed_kmh.abs() / p.full_steer_speed_kmh),
            &0.0,
            &1.0,
        );
        let yaw_rate_degs = steering * p.max_yaw_rate_degs * steer_authority * sign(self.speed_kmh);
        self.heading_deg = norm_angle_deg(self.heading_deg + yaw_rate_degs * dt);

        let heading_rad = self.heading_deg.to_radians();
        let forward = Vector3::new(heading_rad.cos(), heading_rad.sin(), 0.0);
        let new_position =
            self.position + forward * (self.speed_kmh / KMH_PER_MS * p.wu_per_m * dt);

        if blocked(&new_position) {
            self.speed_kmh = 0.0;
        } else {
            self.position = new_position;
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use drive_if::actuator::ActuatorSink;

    use super::*;

    pub(crate) fn vehicle_params() -> VehicleParams {
        VehicleParams {
            start_position: [0.0, 0.0],
            start_heading_deg: 0.0,
            body_radius: 100.0,
            wu_per_m: 100.0,
            max_speed_kmh: 120.0,
            max_reverse_speed_kmh: 20.0,
            max_accel_kmhs: 20.0,
            max_brake_kmhs: 40.0,
            handbrake_kmhs: 60.0,
            drag_per_s: 0.0,
            max_yaw_rate_degs: 90.0,
            full_steer_speed_kmh: 20.0,
        }
    }

    #[test]
    fn test_accelerate_and_turn() {
        let mut veh = SimVehicle::new(vehicle_params());
        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(1.0, 0.0);

        for _ in 0..10 {
            veh.step(0.1, &cmd, |_| false);
        }
        let state = veh.state();
        assert!((state.speed_kmh - 20.0).abs() < 1e-9);
        assert!(state.position().x > 0.0);
        assert!(state.position().y.abs() < 1e-9);

        // Positive steering turns left
        cmd.set_steering(1.0);
        veh.step(0.1, &cmd, |_| false);
        assert!(veh.state().pose.heading_deg() > 0.0);
    }

    #[test]
    fn test_brake_from_rest_reverses() {
        let mut veh = SimVehicle::new(vehicle_params());
        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(0.0, 0.5);

        veh.step(0.1, &cmd, |_| false);
        assert!(veh.state().speed_kmh < 0.0);
        assert!(veh.position().x < 0.0);

        for _ in 0..100 {
            veh.step(0.1, &cmd, |_| false);
        }
        assert_eq!(veh.state().speed_kmh, -20.0);
    }

    #[test]
    fn test_handbrake_stops() {
        let mut veh = SimVehicle::new(vehicle_params());
        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(1.0, 0.0);
        for _ in 0..10 {
            veh.step(0.1, &cmd, |_| false);
        }

        cmd.set_handbrake(true);
        veh.step(0.1, &cmd, |_| false);
        assert!((veh.state().speed_kmh - 14.0).abs() < 1e-9);

        for _ in 0..5 {
            veh.step(0.1, &cmd, |_| false);
        }
        assert_eq!(veh.state().speed_kmh, 0.0);
    }

    #[test]
    fn test_blocked_move_stops() {
        let mut veh = SimVehicle::new(vehicle_params());
        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(1.0, 0.0);

        veh.step(0.1, &cmd, |p| p.x > 0.0);
        assert_eq!(veh.state().speed_kmh, 0.0);
        assert_eq!(veh.position(), Vector3::zeros());
    }
}
