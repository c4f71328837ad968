//! # Path follower
//!
//! Drives the vehicle around a closed reference curve. A goal point is advanced along the curve
//! ahead of the vehicle, weaving from side to side so that a field of vehicles doesn't all take
//! the same line, and the vehicle steers proportionally towards it.
//!
//! How far ahead the goal sits depends on speed: the goal is only advanced once the vehicle is
//! within `distance_threshold` of it, and the threshold shrinks from a large start value during
//! the first few seconds before tracking a speed dependent target. Throttle is limited by how far
//! the vehicle has strayed from the curve, and the brake is applied when the vehicle is going
//! faster than the curve ahead allows.
//!
//! If the vehicle sits near stationary for too long it is considered stuck. While stuck it holds
//! the brake and probes straight ahead, and once the probe is clear the follow succeeds with a
//! recovery waypoint just ahead on the curve. The caller is expected to restart the follow after
//! handling the waypoint.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use drive_if::{
    actuator::ActuatorSink,
    scene::{SceneQuery, TraceChannel},
    task::TaskStatus,
    vehicle::VehicleState,
};
use log::{debug, info, trace, warn};
use nalgebra::Vector3;
use util::maths::{clamp, interp_to, map_range_clamped, wrap};

use super::{
    curve::RefCurve,
    geom::{flatten, look_at_heading_deg, yaw_delta_deg, SMALL_LENGTH},
};

pub use params::{DriveStyle, PathFollowParams};
pub use state::PathFollowState;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Follows a reference curve, recovering from being stuck.
pub struct PathFollower {
    params: PathFollowParams,

    style: DriveStyle,

    /// State of the current follow, `None` until the follow is started.
    state: Option<PathFollowState>,
}

/// Output of one follow tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FollowOutput {
    pub status: TaskStatus,

    /// Recovery waypoint, published when the follow succeeds.
    pub waypoint: Option<Vector3<f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathFollower {
    pub fn new(params: PathFollowParams, style: DriveStyle) -> Self {
        Self {
            params,
            style,
            state: None,
        }
    }

    /// Start a new follow, placing the goal at the point on the curve closest to the vehicle.
    pub fn start(&mut self, curve: &dyn RefCurve, vehicle: &VehicleState) {
        let key = if curve.num_points() > 0 {
            curve.key_closest_to(&vehicle.position())
        } else {
            0.0
        };

        debug!("Starting path follow at key {:.3}", key);

        self.state = Some(PathFollowState::new(
            key,
            self.params.start_distance_threshold,
        ));
    }

    /// Stop the follow, zeroing steering, throttle and brake.
    pub fn abort(&mut self, sink: &mut dyn ActuatorSink) -> FollowOutput {
        sink.set_steering(0.0);
        sink.set_throttle_and_brake(0.0, 0.0);
        self.state = None;

        FollowOutput {
            status: TaskStatus::Aborted,
            waypoint: None,
        }
    }

    /// State of the current follow, if one has been started.
    pub fn state(&self) -> Option<&PathFollowState> {
        self.state.as_ref()
    }

    /// Advance the follow by `dt` seconds.
    ///
    /// A follow which hasn't been started is started first. A curve with no points cannot be
    /// followed and aborts the follow.
    pub fn tick(
        &mut self,
        dt: f64,
        vehicle: &VehicleState,
        curve: &dyn RefCurve,
        scene: &dyn SceneQuery,
        sink: &mut dyn ActuatorSink,
    ) -> FollowOutput {
        if curve.num_points() == 0 {
            warn!("Reference curve has no points, aborting path follow");
            return self.abort(sink);
        }

        if self.state.is_none() {
            self.start(curve, vehicle);
        }

        let p = &self.params;
        let s = match self.state.as_mut() {
            Some(s) => s,
            None => return FollowOutput::default(),
        };

        let num_points = curve.num_points() as f64;
        let position = vehicle.position();
        let speed = vehicle.speed_kmh;
        let speed_range = (p.speed_range_kmh[0], p.speed_range_kmh[1]);

        s.elapsed += dt;

        let distance_along = curve.distance_along_at(s.current_key) - s.distance_threshold;
        s.vehicle_on_path = curve.point_at_distance(distance_along);

        // Weave
        s.offset_time += dt * p.weave_rate;
        s.lateral_offset =
            curve.right_vector_at(s.current_key) * (p.weave_amplitude * s.offset_time.sin());

        s.goal = curve.point_at(s.current_key) + s.lateral_offset;

        // Advance the goal once the vehicle is close enough to it
        if (s.goal - position).norm() < s.distance_threshold {
            let target_threshold = map_range_clamped(
                speed_range,
                (p.goal_distance_range[0], p.goal_distance_range[1]),
                speed,
            );

            s.distance_threshold = if s.elapsed < p.startup_duration_s {
                (p.start_distance_threshold - s.elapsed * p.startup_threshold_rate)
                    .max(target_threshold)
            } else {
                interp_to(
                    s.distance_threshold,
                    target_threshold,
                    dt,
                    p.threshold_interp_speed,
                )
            };

            s.current_key = wrap(
                s.current_key + p.key_rate * dt + speed / p.key_speed_divisor_kmh,
                num_points,
            );
        }

        if !s.stuck {
            if speed > -p.stuck_speed_kmh && speed < p.stuck_speed_kmh {
                s.time_stuck += dt;

                if s.time_stuck >= p.stuck_time_s {
                    warn!(
                        "Vehicle stuck at ({:.1}, {:.1}), probing for a way out",
                        position.x, position.y
                    );
                    s.stuck = true;
                    s.time_stuck = 0.0;
                }
            } else {
                s.time_stuck = 0.0;
            }
        } else {
            let probe_start = position + Vector3::new(0.0, 0.0, p.probe_height);
            let probe_end = probe_start + vehicle.pose.forward() * p.probe_length;

            if scene
                .cast_ray(probe_start, probe_end, TraceChannel::WorldStatic)
                .is_none()
            {
                let waypoint =
                    curve.point_at(wrap(s.current_key + 1.0, num_points)) + s.lateral_offset;
                s.goal = waypoint;

                info!(
                    "Path ahead is clear, recovering via ({:.1}, {:.1})",
                    waypoint.x, waypoint.y
                );

                return FollowOutput {
                    status: TaskStatus::Succeeded,
                    waypoint: Some(waypoint),
                };
            }
        }

        // Steering
        let steering = if s.stuck || flatten(&(s.goal - position)).norm() < SMALL_LENGTH {
            0.0
        } else {
            let goal_heading_deg = look_at_heading_deg(&position, &s.goal);
            let yaw_error_deg = yaw_delta_deg(goal_heading_deg, vehicle.pose.heading_deg());
            clamp(&(yaw_error_deg / p.steering_range_deg), &-1.0, &1.0)
        };
        sink.set_steering(steering);

        // Throttle from how far we are off the curve
        let path_distance = (s.vehicle_on_path + s.lateral_offset - position).norm();
        let throttle = p.throttle_by_path_distance.eval(path_distance);

        // Brake when the curve ahead is tighter than our speed allows
        let lookahead = map_range_clamped(
            speed_range,
            (p.lookahead_key_range[0], p.lookahead_key_range[1]),
            speed,
        );
        let upcoming = curve.forward_vector_at(wrap(s.current_key + lookahead, num_points));
        let alignment = vehicle.pose.forward().dot(&upcoming);
        let max_speed = p.max_speed_by_alignment.eval(alignment) + self.style.max_speed_delta_kmh;
        let brake = clamp(&((speed - max_speed) / p.brake_speed_range_kmh), &0.0, &1.0);

        if s.stuck {
            sink.set_throttle_and_brake(0.0, p.stuck_brake);
        } else {
            sink.set_throttle_and_brake(throttle, brake);
        }

        trace!(
            "Follow key {:.3}, thr {:.1}, steer {:.3}, throttle {:.3}, brake {:.3}",
            s.current_key,
            s.distance_threshold,
            steering,
            throttle,
            brake
        );

        FollowOutput {
            status: TaskStatus::InProgress,
            waypoint: None,
        }
    }
}
