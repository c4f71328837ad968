//! # Obstacle avoider
//!
//! Sweeps a ring of horizontal probes around the vehicle and steers away from the nearest hit.
//!
//! Probe `i` of `N` is the vehicle's right vector rotated about its up vector by `i * 360/N`
//! degrees, so probe angles in `[0, 180)` cover the forward half of the vehicle. An obstacle in the
//! forward half is driven away from under throttle, one in the rear half is backed away from under
//! brake, with the steering sense inverted.
//!
//! Avoidance completes once the sweep has been clear for `clear_time_s`, or as soon as the
//! vehicle is out of probe range of the last obstacle it saw, at which point the vehicle is
//! brought to rest with the handbrake.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use drive_if::{
    actuator::ActuatorSink,
    scene::{SceneQuery, TraceChannel},
    task::TaskStatus,
    vehicle::VehicleState,
};
use log::{debug, info, trace};
use nalgebra::Vector3;
use serde::Serialize;
use util::maths::clamp;

use super::geom::{
    flatten, lerp_vec, look_at_heading_deg, rotate_about, safe_normal, yaw_delta_deg, SMALL_LENGTH,
};

pub use params::ObstacleAvoidParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Radial obstacle sweep and avoidance controller.
pub struct ObstacleAvoider {
    params: ObstacleAvoidParams,

    result: ObstacleSensorResult,
}

/// The nearest hit of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleHit {
    /// Units: world units
    pub distance: f64,

    pub impact_point: Vector3<f64>,

    /// Angle of the probe which hit, measured from the vehicle's right vector about its up vector.
    ///
    /// Units: degrees
    pub angle_deg: f64,

    /// True if the hit is in the forward half of the vehicle.
    pub forward: bool,
}

/// Sensor state persisted between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ObstacleSensorResult {
    /// Time since the sweep last hit anything.
    ///
    /// Units: seconds
    pub time_without_hit: f64,

    /// Time the sweep has been continuously hitting something.
    ///
    /// Units: seconds
    pub hit_time: f64,

    /// The most recent nearest hit.
    pub last_hit: Option<ObstacleHit>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ObstacleAvoider {
    pub fn new(params: ObstacleAvoidParams) -> Self {
        Self {
            params,
            result: ObstacleSensorResult::default(),
        }
    }

    pub fn result(&self) -> &ObstacleSensorResult {
        &self.result
    }

    /// Clear the sensor state ready for a new avoidance.
    pub fn reset(&mut self) {
        self.result = ObstacleSensorResult::default();
    }

    /// Stop avoiding, zeroing steering, throttle and brake.
    pub fn abort(&mut self, sink: &mut dyn ActuatorSink) -> TaskStatus {
        sink.set_steering(0.0);
        sink.set_throttle_and_brake(0.0, 0.0);
        self.reset();

        TaskStatus::Aborted
    }

    /// Sweep the probes around the vehicle, returning the nearest hit.
    ///
    /// Ties go to the lowest probe angle.
    pub fn sweep(&self, vehicle: &VehicleState, scene: &dyn SceneQuery) -> Option<ObstacleHit> {
        if self.params.raycast_count == 0 {
            return None;
        }

        let start = vehicle.position() + Vector3::new(0.0, 0.0, self.params.probe_height);
        let right = vehicle.pose.right();
        let up = vehicle.pose.up();
        let step_deg = 360.0 / self.params.raycast_count as f64;

        let mut nearest: Option<ObstacleHit> = None;

        for i in 0..self.params.raycast_count {
            let angle_deg = step_deg * i as f64;
            let dir = rotate_about(&right, &up, angle_deg);
            let end = start + dir * self.params.raycast_distance;

            let hit = match scene.cast_ray(start, end, TraceChannel::VehicleAvoidance) {
                Some(h) => h,
                None => continue,
            };

            if nearest.map_or(true, |n| hit.distance < n.distance) {
                nearest = Some(ObstacleHit {
                    distance: hit.distance,
                    impact_point: hit.impact_point,
                    angle_deg,
                    forward: angle_deg < 180.0,
                });
            }
        }

        nearest
    }

    /// Sweep and react to the result.
    pub fn tick(
        &mut self,
        dt: f64,
        vehicle: &VehicleState,
        scene: &dyn SceneQuery,
        sink: &mut dyn ActuatorSink,
    ) -> TaskStatus {
        let hit = self.sweep(vehicle, scene);
        self.apply(dt, vehicle, hit, sink)
    }

    /// React to the result of a sweep.
    pub fn apply(
        &mut self,
        dt: f64,
        vehicle: &VehicleState,
        hit: Option<ObstacleHit>,
        sink: &mut dyn ActuatorSink,
    ) -> TaskStatus {
        let position = vehicle.position();

        let hit = match hit {
            Some(h) => h,
            None => {
                self.result.time_without_hit += dt;
                self.result.hit_time = 0.0;

                let out_of_range = self.result.last_hit.map_or(false, |h| {
                    (position - h.impact_point).norm() > self.params.raycast_distance
                });

                if self.result.time_without_hit >= self.params.clear_time_s || out_of_range {
                    info!(
                        "Obstacle cleared after {:.2} s without a hit",
                        self.result.time_without_hit
                    );
                    sink.set_steering(0.0);
                    sink.set_throttle_and_brake(0.0, 0.0);
                    sink.set_handbrake(true);
                    return TaskStatus::Succeeded;
                }

                return TaskStatus::InProgress;
            }
        };

        if self.result.last_hit.is_none() {
            debug!(
                "Obstacle at {:.1} wu, probe angle {:.1} deg",
                hit.distance, hit.angle_deg
            );
        }

        self.result.time_without_hit = 0.0;
        self.result.hit_time += dt;
        self.result.last_hit = Some(hit);

        // Direction away from the obstacle, mirrored for rear half hits
        let away = position - hit.impact_point;
        let away = if hit.forward {
            Vector3::new(away.x, away.y, 0.0)
        } else {
            Vector3::new(-away.x, -away.y, 0.0)
        };
        let avoid_dir = safe_normal(&away);
        let forward = safe_normal(&flatten(&vehicle.pose.forward()));

        let blend = lerp_vec(&forward, &avoid_dir, avoid_dir.dot(&forward).abs());
        let goal = position + blend * self.params.goal_distance;

        let steering = if flatten(&(goal - position)).norm() < SMALL_LENGTH {
            0.0
        } else {
            let goal_heading_deg = look_at_heading_deg(&position, &goal);
            let yaw_error_deg = yaw_delta_deg(goal_heading_deg, vehicle.pose.heading_deg());
            clamp(
                &(yaw_error_deg / self.params.steering_angle_range_deg),
                &-1.0,
                &1.0,
            )
        };

        if hit.forward {
            sink.set_steering(steering);
            sink.set_throttle_and_brake(self.params.forward_throttle, 0.0);
        } else {
            sink.set_steering(-steering);
            sink.set_throttle_and_brake(0.0, self.params.reverse_brake);
        }
        sink.set_handbrake(false);

        trace!(
            "Avoiding obstacle at {:.1} wu ({}), steering {:.3}",
            hit.distance,
            if hit.forward { "ahead" } else { "behind" },
            steering
        );

        TaskStatus::InProgress
    }
}

#[cfg(test)]
mod test {
    use std::cell::{Cell, RefCell};

    use drive_if::{actuator::ActuatorCommand, scene::RayHit, vehicle::Pose};

    use super::*;

    /// Scene returning hits along set directions from the probe start.
    #[derive(Default)]
    struct FakeScene {
        hits: RefCell<Vec<(Vector3<f64>, f64)>>,
        casts: Cell<usize>,
    }

    impl FakeScene {
        fn with_hits(hits: Vec<(Vector3<f64>, f64)>) -> Self {
            Self {
                hits: RefCell::new(hits),
                casts: Cell::new(0),
            }
        }
    }

    impl SceneQuery for FakeScene {
        fn cast_ray(
            &self,
            start: Vector3<f64>,
            end: Vector3<f64>,
            channel: TraceChannel,
        ) -> Option<RayHit> {
            assert_eq!(channel, TraceChannel::VehicleAvoidance);
            self.casts.set(self.casts.get() + 1);

            let dir = (end - start).normalize();
            self.hits
                .borrow()
                .iter()
                .find(|(d, _)| d.normalize().dot(&dir) > 0.999)
                .map(|(_, distance)| RayHit {
                    distance: *distance,
                    impact_point: start + dir * *distance,
                })
        }
    }

    fn vehicle_at(x: f64, y: f64) -> VehicleState {
        VehicleState::new(Pose::from_heading_deg(Vector3::new(x, y, 0.0), 0.0), 20.0)
    }

    fn avoider(raycast_count: usize) -> ObstacleAvoider {
        ObstacleAvoider::new(ObstacleAvoidParams {
            raycast_count,
            ..Default::default()
        })
    }

    #[test]
    fn test_sweep_nearest() {
        let oa = avoider(8);
        let scene = FakeScene::with_hits(vec![
            (Vector3::new(1.0, 0.0, 0.0), 120.0),
            (Vector3::new(-1.0, -1.0, 0.0), 60.0),
            (Vector3::new(0.0, 1.0, 0.0), 60.0),
        ]);

        let hit = oa.sweep(&vehicle_at(0.0, 0.0), &scene).unwrap();
        assert_eq!(scene.casts.get(), 8);

        // The left probe (180 deg) and the rear right probe (315 deg) tie, the first wins
        assert_eq!(hit.distance, 60.0);
        assert_eq!(hit.angle_deg, 180.0);
        assert!(!hit.forward);

        assert!(oa.sweep(&vehicle_at(0.0, 0.0), &FakeScene::default()).is_none());
    }

    #[test]
    fn test_forward_hit_drives_on() {
        let mut oa = avoider(8);
        let scene = FakeScene::with_hits(vec![(Vector3::new(1.0, 0.0, 0.0), 50.0)]);
        let mut cmd = ActuatorCommand::default();
        cmd.set_handbrake(true);

        let status = oa.tick(0.1, &vehicle_at(0.0, 0.0), &scene, &mut cmd);

        let hit = oa.result().last_hit.unwrap();
        assert_eq!(hit.angle_deg, 90.0);
        assert!(hit.forward);
        assert_eq!(status, TaskStatus::InProgress);
        assert_eq!(cmd.throttle, 0.8);
        assert_eq!(cmd.brake, 0.0);
        assert!(!cmd.handbrake);
        assert_eq!(cmd.steering.abs(), 1.0);
    }

    #[test]
    fn test_steers_away_from_obstacle() {
        let mut oa = avoider(8);
        let mut cmd = ActuatorCommand::default();
        let veh = vehicle_at(0.0, 0.0);

        // Front right, turn left
        let scene = FakeScene::with_hits(vec![(Vector3::new(1.0, -1.0, 0.0), 50.0)]);
        oa.tick(0.1, &veh, &scene, &mut cmd);
        assert!(cmd.steering > 0.0);

        // Front left, turn right
        let scene = FakeScene::with_hits(vec![(Vector3::new(1.0, 1.0, 0.0), 50.0)]);
        oa.tick(0.1, &veh, &scene, &mut cmd);
        assert!(cmd.steering < 0.0);

        // Rear right, back away with the steering inverted
        let scene = FakeScene::with_hits(vec![(Vector3::new(-1.0, -1.0, 0.0), 50.0)]);
        oa.tick(0.1, &veh, &scene, &mut cmd);
        assert!(!oa.result().last_hit.unwrap().forward);
        assert!(cmd.steering > 0.0);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.brake, 0.8);
        assert!(!cmd.handbrake);
    }

    #[test]
    fn test_hit_at_sweep_origin() {
        let mut oa = avoider(8);
        let veh = vehicle_at(100.0, -50.0);
        let mut cmd = ActuatorCommand::default();

        // An obstacle touching the sweep origin gives no direction to steer away from
        let hit = ObstacleHit {
            distance: 0.0,
            impact_point: veh.position() + Vector3::new(0.0, 0.0, 20.0),
            angle_deg: 90.0,
            forward: true,
        };
        let status = oa.apply(0.1, &veh, Some(hit), &mut cmd);

        assert_eq!(status, TaskStatus::InProgress);
        assert!(cmd.steering.is_finite());
        assert_eq!(cmd.steering, 0.0);
        assert_eq!(cmd.throttle, 0.8);
        assert_eq!(cmd.brake, 0.0);
    }

    #[test]
    fn test_clears_after_clear_time() {
        let mut oa = avoider(8);
        let blocked = FakeScene::with_hits(vec![(Vector3::new(1.0, 0.0, 0.0), 50.0)]);
        let clear = FakeScene::default();
        let veh = vehicle_at(0.0, 0.0);
        let mut cmd = ActuatorCommand::default();

        oa.tick(0.125, &veh, &blocked, &mut cmd);
        let driving = cmd;

        for _ in 0..3 {
            assert_eq!(oa.tick(0.125, &veh, &clear, &mut cmd), TaskStatus::InProgress);
            assert_eq!(cmd, driving);
        }

        // A single hit resets the clear timer
        oa.tick(0.125, &veh, &blocked, &mut cmd);
        assert_eq!(oa.result().time_without_hit, 0.0);
        assert_eq!(oa.result().hit_time, 0.125);

        for _ in 0..3 {
            assert_eq!(oa.tick(0.125, &veh, &clear, &mut cmd), TaskStatus::InProgress);
        }
        assert_eq!(oa.result().hit_time, 0.0);

        assert_eq!(oa.tick(0.125, &veh, &clear, &mut cmd), TaskStatus::Succeeded);
        assert_eq!(cmd.steering, 0.0);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.brake, 0.0);
        assert!(cmd.handbrake);
    }

    #[test]
    fn test_clears_when_out_of_range() {
        let mut oa = avoider(8);
        let blocked = FakeScene::with_hits(vec![(Vector3::new(1.0, 0.0, 0.0), 50.0)]);
        let clear = FakeScene::default();
        let mut cmd = ActuatorCommand::default();

        oa.tick(0.01, &vehicle_at(0.0, 0.0), &blocked, &mut cmd);

        assert_eq!(
            oa.tick(0.01, &vehicle_at(-200.0, 0.0), &clear, &mut cmd),
            TaskStatus::InProgress
        );
        assert_eq!(
            oa.tick(0.01, &vehicle_at(-400.0, 0.0), &clear, &mut cmd),
            TaskStatus::Succeeded
        );
    }

    #[test]
    fn test_reset_and_abort() {
        let mut oa = avoider(8);
        let blocked = FakeScene::with_hits(vec![(Vector3::new(1.0, 0.0, 0.0), 50.0)]);
        let mut cmd = ActuatorCommand::default();

        oa.tick(0.1, &vehicle_at(0.0, 0.0), &blocked, &mut cmd);
        assert!(oa.result().last_hit.is_some());

        oa.reset();
        assert_eq!(*oa.result(), ObstacleSensorResult::default());

        oa.tick(0.1, &vehicle_at(0.0, 0.0), &blocked, &mut cmd);
        assert_eq!(oa.abort(&mut cmd), TaskStatus::Aborted);
        assert_eq!(cmd.steering, 0.0);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.brake, 0.0);
        assert_eq!(*oa.result(), ObstacleSensorResult::default());
    }
}
