//! # Drive manager
//!
//! Each vehicle owns one [`DriveMgr`], which owns one instance of each controller and arbitrates
//! between them every step:
//!
//! - The [`TargetTracker`] always runs, and only ever writes the modifier channels.
//! - In `Follow` mode the obstacle sweep runs first. If it hits anything the manager switches to
//!   `Avoid` and the [`ObstacleAvoider`] takes the actuators for that step, otherwise the
//!   [`PathFollower`] drives.
//! - In `Avoid` mode the [`ObstacleAvoider`] drives until it reports success, after which the
//!   manager returns to `Follow`.
//!
//! When the follower recovers from being stuck its waypoint is passed out on the step output and
//! the follow is restarted on the next step.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
pub mod tm;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use drive_if::{
    actuator::ActuatorSink, perception::ActorHandle, scene::SceneQuery, task::TaskStatus,
    vehicle::{ActorId, VehicleState},
};
use log::{info, trace};
use nalgebra::Vector3;
use serde::Serialize;

use super::{
    curve::RefCurve, obstacle_avoid::ObstacleAvoider, path_follow::PathFollower,
    target_tracker::TargetTracker,
};

pub use self::{params::DriveMgrParams, tm::DriveTm};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Per-vehicle controller arbitration.
pub struct DriveMgr {
    tracker: TargetTracker,

    follower: PathFollower,

    avoider: ObstacleAvoider,

    mode: DriveMode,

    /// Set when the follow must be restarted before the follower next runs.
    restart_follow: bool,

    tm: DriveTm,
}

/// Inputs to one drive step.
pub struct DriveInput<'a> {
    /// Time since the last step.
    ///
    /// Units: seconds
    pub dt: f64,

    /// State of the vehicle, `None` if it isn't available this step.
    pub vehicle: Option<VehicleState>,

    /// New set of perceived actors, if perception updated since the last step.
    pub perceived: Option<Vec<ActorHandle>>,

    pub curve: &'a dyn RefCurve,

    pub scene: &'a dyn SceneQuery,
}

/// Output of one drive step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveOutput {
    /// Mode the step was executed in.
    pub mode: DriveMode,

    /// Status of the controller which drove the step.
    pub status: TaskStatus,

    /// Recovery waypoint published by the follower.
    pub waypoint: Option<Vector3<f64>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DriveMgrError {
    #[error("Failed to load DriveMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),
}

/// Which controller owns the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveMode {
    Follow,
    Avoid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveMgr {
    /// Load the parameters from the given file (relative to the software root's `params`
    /// directory) and create a new manager.
    pub fn init(params_path: &str, owner_id: ActorId) -> Result<Self, DriveMgrError> {
        let params: DriveMgrParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(DriveMgrError::ParamLoadError(e)),
        };

        Ok(Self::new(params, owner_id))
    }

    pub fn new(params: DriveMgrParams, owner_id: ActorId) -> Self {
        Self {
            tracker: TargetTracker::new(params.target_tracker, owner_id),
            follower: PathFollower::new(params.path_follow, params.drive_style),
            avoider: ObstacleAvoider::new(params.obstacle_avoid),
            mode: DriveMode::Follow,
            restart_follow: true,
            tm: DriveTm::default(),
        }
    }

    /// Run one step of all controllers.
    ///
    /// Returns `None` if the vehicle state is unavailable, in which case nothing is done.
    pub fn step(
        &mut self,
        input: DriveInput,
        sink: &mut dyn ActuatorSink,
    ) -> Option<DriveOutput> {
        let vehicle = match input.vehicle {
            Some(v) => v,
            None => {
                trace!("No vehicle state, skipping drive step");
                return None;
            }
        };

        if let Some(actors) = input.perceived {
            self.tracker.update_perceived_actors(actors, &vehicle, sink);
        }
        self.tm.tracker = self.tracker.tick(&vehicle, sink);

        if self.restart_follow {
            self.follower.start(input.curve, &vehicle);
            self.restart_follow = false;
        }

        let mode = self.mode;
        let mut waypoint = None;

        let status = match self.mode {
            DriveMode::Follow => match self.avoider.sweep(&vehicle, input.scene) {
                Some(hit) => {
                    info!(
                        "Obstacle {:.1} wu away, switching to avoidance",
                        hit.distance
                    );
                    self.mode = DriveMode::Avoid;
                    self.avoider.reset();
                    self.avoider.apply(input.dt, &vehicle, Some(hit), sink)
                }
                None => {
                    let out =
                        self.follower
                            .tick(input.dt, &vehicle, input.curve, input.scene, sink);
                    sink.set_handbrake(false);

                    if out.status == TaskStatus::Succeeded {
                        self.restart_follow = true;
                        waypoint = out.waypoint;
                    }

                    out.status
                }
            },
            DriveMode::Avoid => {
                let status = self.avoider.tick(input.dt, &vehicle, input.scene, sink);

                if status == TaskStatus::Succeeded {
                    info!("Avoidance complete, resuming path follow");
                    self.mode = DriveMode::Follow;
                }

                status
            }
        };

        self.tm.mode = self.mode;
        self.tm.status = Some(status);
        self.tm.follow = self.follower.state().copied();
        self.tm.obstacle = *self.avoider.result();
        if waypoint.is_some() {
            self.tm.waypoint = waypoint;
        }

        Some(DriveOutput {
            mode,
            status,
            waypoint,
        })
    }

    /// Abort driving, zeroing all actuator demands and modifiers and releasing the handbrake.
    ///
    /// The next step restarts the follow.
    pub fn abort(&mut self, sink: &mut dyn ActuatorSink) -> DriveOutput {
        info!("Drive aborted");

        let mode = self.mode;

        self.follower.abort(sink);
        self.avoider.abort(sink);
        self.tracker.set_target(None, sink);
        sink.set_handbrake(false);

        self.mode = DriveMode::Follow;
        self.restart_follow = true;
        self.tm.mode = self.mode;
        self.tm.status = Some(TaskStatus::Aborted);

        DriveOutput {
            mode,
            status: TaskStatus::Aborted,
            waypoint: None,
        }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn get_tm(&self) -> DriveTm {
        self.tm.clone()
    }
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Follow
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use drive_if::{
        actuator::ActuatorCommand,
        perception::{MovementControl, MovementHandle, PerceivedActor},
        scene::{RayHit, TraceChannel},
        vehicle::Pose,
    };

    use super::*;
    use crate::auto::curve::PolylineCurve;

    /// Scene with a switchable wall straight ahead of the vehicle and a switchable obstacle on the
    /// avoidance channel straight ahead.
    #[derive(Default)]
    struct FakeScene {
        wall: Cell<bool>,
        obstacle: Cell<bool>,
    }

    impl SceneQuery for FakeScene {
        fn cast_ray(
            &self,
            start: Vector3<f64>,
            end: Vector3<f64>,
            channel: TraceChannel,
        ) -> Option<RayHit> {
            let dir = (end - start).normalize();
            let blocked = match channel {
                TraceChannel::WorldStatic => self.wall.get(),
                TraceChannel::VehicleAvoidance => self.obstacle.get(),
            };

            if blocked && dir.x > 0.999 {
                Some(RayHit {
                    distance: 50.0,
                    impact_point: start + dir * 50.0,
                })
            } else {
                None
            }
        }
    }

    struct Rival;

    impl PerceivedActor for Rival {
        fn id(&self) -> ActorId {
            7
        }

        fn pose(&self) -> Pose {
            Pose::from_heading_deg(Vector3::new(1100.0, 0.0, 0.0), 0.0)
        }

        fn movement_control(&self) -> Option<MovementHandle> {
            let movement: MovementHandle = Rc::new(Rival);
            Some(movement)
        }
    }

    impl MovementControl for Rival {
        fn speed_kmh(&self) -> f64 {
            40.0
        }
    }

    fn curve() -> PolylineCurve {
        PolylineCurve::new(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10000.0, 0.0, 0.0),
            Vector3::new(10000.0, 10000.0, 0.0),
            Vector3::new(0.0, 10000.0, 0.0),
        ])
        .unwrap()
    }

    fn vehicle(speed_kmh: f64) -> Option<VehicleState> {
        Some(VehicleState::new(
            Pose::from_heading_deg(Vector3::new(1000.0, 0.0, 0.0), 0.0),
            speed_kmh,
        ))
    }

    fn input<'a>(
        dt: f64,
        vehicle: Option<VehicleState>,
        curve: &'a PolylineCurve,
        scene: &'a FakeScene,
    ) -> DriveInput<'a> {
        DriveInput {
            dt,
            vehicle,
            perceived: None,
            curve,
            scene,
        }
    }

    #[test]
    fn test_skip_without_vehicle() {
        let mut mgr = DriveMgr::new(DriveMgrParams::default(), 1);
        let curve = curve();
        let scene = FakeScene::default();
        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(0.3, 0.0);

        assert!(mgr.step(input(0.1, None, &curve, &scene), &mut cmd).is_none());
        assert_eq!(cmd.throttle, 0.3);
        assert!(mgr.get_tm().status.is_none());
    }

    #[test]
    fn test_follow_and_track() {
        let mut mgr = DriveMgr::new(DriveMgrParams::default(), 1);
        let curve = curve();
        let scene = FakeScene::default();
        let mut cmd = ActuatorCommand::default();
        cmd.set_handbrake(true);

        let mut inp = input(0.1, vehicle(30.0), &curve, &scene);
        inp.perceived = Some(vec![Rc::new(Rival) as ActorHandle]);
        let out = mgr.step(inp, &mut cmd).unwrap();

        assert_eq!(out.mode, DriveMode::Follow);
        assert_eq!(out.status, TaskStatus::InProgress);
        assert!(!cmd.handbrake);
        assert!(cmd.throttle > 0.0);

        let tm = mgr.get_tm();
        assert_eq!(tm.tracker.target_id, Some(7));
        assert!(tm.follow.is_some());
        assert!(cmd.steering_modifier.weight > 0.0);
    }

    #[test]
    fn test_obstacle_avoidance_cycle() {
        let mut mgr = DriveMgr::new(DriveMgrParams::default(), 1);
        let curve = curve();
        let scene = FakeScene::default();
        let mut cmd = ActuatorCommand::default();

        mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd);
        assert_eq!(mgr.mode(), DriveMode::Follow);

        // The avoider drives on the step the obstacle is first seen
        scene.obstacle.set(true);
        let out = mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd).unwrap();
        assert_eq!(out.mode, DriveMode::Follow);
        assert_eq!(out.status, TaskStatus::InProgress);
        assert_eq!(mgr.mode(), DriveMode::Avoid);
        assert_eq!(cmd.throttle, 0.8);
        assert_eq!(cmd.brake, 0.0);

        scene.obstacle.set(false);
        for _ in 0..3 {
            let out = mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd).unwrap();
            assert_eq!(out.mode, DriveMode::Avoid);
            assert_eq!(out.status, TaskStatus::InProgress);
        }

        let out = mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd).unwrap();
        assert_eq!(out.status, TaskStatus::Succeeded);
        assert!(cmd.handbrake);
        assert_eq!(mgr.mode(), DriveMode::Follow);

        let out = mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd).unwrap();
        assert_eq!(out.mode, DriveMode::Follow);
        assert!(!cmd.handbrake);
    }

    #[test]
    fn test_stuck_recovery_restarts_follow() {
        let mut mgr = DriveMgr::new(DriveMgrParams::default(), 1);
        let curve = curve();
        let scene = FakeScene::default();
        scene.wall.set(true);
        let mut cmd = ActuatorCommand::default();

        for _ in 0..7 {
            let out = mgr.step(input(0.25, vehicle(0.0), &curve, &scene), &mut cmd).unwrap();
            assert_eq!(out.status, TaskStatus::InProgress);
            assert_eq!(out.waypoint, None);
        }
        assert!(mgr.get_tm().follow.unwrap().stuck);

        scene.wall.set(false);
        let out = mgr.step(input(0.25, vehicle(0.0), &curve, &scene), &mut cmd).unwrap();
        assert_eq!(out.status, TaskStatus::Succeeded);
        assert!(out.waypoint.is_some());
        assert_eq!(mgr.get_tm().waypoint, out.waypoint);

        let out = mgr.step(input(0.25, vehicle(0.0), &curve, &scene), &mut cmd).unwrap();
        assert_eq!(out.status, TaskStatus::InProgress);
        let follow = mgr.get_tm().follow.unwrap();
        assert!(!follow.stuck);
        assert_eq!(follow.elapsed, 0.25);
    }

    #[test]
    fn test_abort_zeroes_outputs() {
        let mut mgr = DriveMgr::new(DriveMgrParams::default(), 1);
        let curve = curve();
        let scene = FakeScene::default();
        let mut cmd = ActuatorCommand::default();

        let mut inp = input(0.1, vehicle(30.0), &curve, &scene);
        inp.perceived = Some(vec![Rc::new(Rival) as ActorHandle]);
        mgr.step(inp, &mut cmd);
        assert!(cmd.throttle > 0.0);

        let out = mgr.abort(&mut cmd);
        assert_eq!(out.status, TaskStatus::Aborted);
        assert_eq!(cmd.steering, 0.0);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.brake, 0.0);
        assert!(cmd.steering_modifier.is_zero());
        assert!(!cmd.handbrake);
        assert_eq!(mgr.get_tm().status, Some(TaskStatus::Aborted));
    }

    #[test]
    fn test_abort_after_avoidance_releases_handbrake() {
        let mut mgr = DriveMgr::new(DriveMgrParams::default(), 1);
        let curve = curve();
        let scene = FakeScene::default();
        let mut cmd = ActuatorCommand::default();

        scene.obstacle.set(true);
        mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd);
        assert_eq!(mgr.mode(), DriveMode::Avoid);

        scene.obstacle.set(false);
        let mut status = TaskStatus::InProgress;
        for _ in 0..4 {
            let out = mgr.step(input(0.125, vehicle(30.0), &curve, &scene), &mut cmd).unwrap();
            status = out.status;
        }
        assert_eq!(status, TaskStatus::Succeeded);
        assert!(cmd.handbrake);

        mgr.abort(&mut cmd);
        assert!(!cmd.handbrake);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(mgr.mode(), DriveMode::Follow);
    }
}
