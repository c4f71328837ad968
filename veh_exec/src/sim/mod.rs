//! # Simulation
//!
//! A closed loop world for exercising the drive manager without a game engine. The world holds a
//! closed polyline track, static cylindrical obstacles, scripted rival vehicles and the kinematic
//! model of the controlled vehicle. It answers the controllers' ray casts and provides a radius
//! based perception feed.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod rival;
mod vehicle;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::rc::Rc;

use drive_if::{
    actuator::ActuatorCommand,
    perception::{ActorHandle, PerceivedActor},
    scene::{RayHit, SceneQuery, TraceChannel},
    vehicle::VehicleState,
};
use log::debug;
use nalgebra::Vector3;

use crate::auto::{
    curve::{CurveError, PolylineCurve},
    geom::SMALL_LENGTH,
};

pub use self::{
    params::{ObstacleParams, RivalParams, SimParams, VehicleParams},
    rival::SimRival,
    vehicle::SimVehicle,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimWorld {
    params: SimParams,

    curve: Rc<PolylineCurve>,

    vehicle: SimVehicle,

    rivals: Vec<Rc<SimRival>>,

    /// Time since the last perception update.
    since_perception_s: f64,

    time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid track: {0}")]
    InvalidTrack(CurveError),

    #[error("The cycle period must be positive, found {0}")]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        if !(params.cycle_period_s > 0.0) {
            return Err(SimError::InvalidCyclePeriod(params.cycle_period_s));
        }

        let points = params
            .track
            .iter()
            .map(|p| Vector3::new(p[0], p[1], 0.0))
            .collect();
        let curve = Rc::new(PolylineCurve::new(points).map_err(SimError::InvalidTrack)?);

        let rivals = params
            .rivals
            .iter()
            .map(|r| Rc::new(SimRival::new(*r, curve.clone())))
            .collect();

        Ok(Self {
            vehicle: SimVehicle::new(params.vehicle.clone()),
            // Perceive on the first cycle
            since_perception_s: params.perception_period_s,
            time_s: 0.0,
            params,
            curve,
            rivals,
        })
    }

    pub fn curve(&self) -> &PolylineCurve {
        &self.curve
    }

    pub fn vehicle_state(&self) -> VehicleState {
        self.vehicle.state()
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Advance the perception clock, returning the perceived actors if an update is due.
    ///
    /// Rivals within the perception radius of the vehicle are perceived, in the order they were
    /// configured.
    pub fn perceive(&mut self, dt: f64) -> Option<Vec<ActorHandle>> {
        self.since_perception_s += dt;
        if self.since_perception_s < self.params.perception_period_s {
            return None;
        }
        self.since_perception_s = 0.0;

        let position = self.vehicle.position();
        let perceived: Vec<ActorHandle> = self
            .rivals
            .iter()
            .filter(|r| (r.pose().position - position).norm() <= self.params.perception_radius)
            .map(|r| {
                let handle: ActorHandle = r.clone();
                handle
            })
            .collect();

        debug!("Perceived {} actors", perceived.len());

        Some(perceived)
    }

    /// Advance the world by `dt` seconds, applying the actuator demands to the vehicle.
    pub fn step(&mut self, dt: f64, cmd: &ActuatorCommand) {
        let wu_per_m = self.params.vehicle.wu_per_m;
        for r in self.rivals.iter() {
            r.step(dt, wu_per_m);
        }

        let obstacles = &self.params.obstacles;
        let body_radius = self.vehicle.body_radius();
        self.vehicle.step(dt, cmd, |p| {
            obstacles.iter().any(|o| {
                (Vector3::new(o.x, o.y, 0.0) - Vector3::new(p.x, p.y, 0.0)).norm()
                    < o.radius + body_radius
            })
        });

        self.time_s += dt;
    }
}

impl SceneQuery for SimWorld {
    fn cast_ray(
        &self,
        start: Vector3<f64>,
        end: Vector3<f64>,
        channel: TraceChannel,
    ) -> Option<RayHit> {
        let statics = self.params.obstacles.iter().map(|o| (o.x, o.y, o.radius));

        let fraction = match channel {
            TraceChannel::WorldStatic => statics
                .filter_map(|c| ray_circle_fraction(&start, &end, c))
                .fold(None, nearest),
            TraceChannel::VehicleAvoidance => {
                let rivals = self.rivals.iter().map(|r| {
                    let p = r.pose().position;
                    (p.x, p.y, r.radius())
                });

                statics
                    .chain(rivals)
                    .filter_map(|c| ray_circle_fraction(&start, &end, c))
                    .fold(None, nearest)
            }
        }?;

        Some(RayHit {
            distance: (end - start).norm() * fraction,
            impact_point: start + (end - start) * fraction,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn nearest(acc: Option<f64>, t: f64) -> Option<f64> {
    match acc {
        Some(a) if a <= t => Some(a),
        _ => Some(t),
    }
}

/// Fraction along the segment `start -> end` at which it first enters the vertical cylinder
/// `(x, y, radius)`, working in the horizontal plane.
///
/// A segment starting inside the cylinder hits it immediately.
fn ray_circle_fraction(
    start: &Vector3<f64>,
    end: &Vector3<f64>,
    (cx, cy, radius): (f64, f64, f64),
) -> Option<f64> {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let (fx, fy) = (start.x - cx, start.y - cy);

    let c = fx * fx + fy * fy - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let a = dx * dx + dy * dy;
    if a < SMALL_LENGTH {
        return None;
    }

    let b = 2.0 * (fx * dx + fy * dy);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let t = (-b - disc.sqrt()) / (2.0 * a);
    if (0.0..=1.0).contains(&t) {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use drive_if::actuator::ActuatorSink;

    use super::*;

    fn sim_params() -> SimParams {
        SimParams {
            cycle_period_s: 0.05,
            duration_s: 10.0,
            track: vec![
                [0.0, 0.0],
                [10000.0, 0.0],
                [10000.0, 10000.0],
                [0.0, 10000.0],
            ],
            perception_radius: 1500.0,
            perception_period_s: 0.5,
            vehicle: vehicle::test::vehicle_params(),
            obstacles: vec![ObstacleParams {
                x: 1000.0,
                y: 0.0,
                radius: 100.0,
            }],
            rivals: vec![
                RivalParams {
                    id: 10,
                    start_distance: 500.0,
                    speed_kmh: 36.0,
                    radius: 150.0,
                },
                RivalParams {
                    id: 11,
                    start_distance: 20000.0,
                    speed_kmh: 36.0,
                    radius: 150.0,
                },
            ],
        }
    }

    #[test]
    fn test_invalid_params() {
        let mut params = sim_params();
        params.track.truncate(1);
        assert!(SimWorld::new(params).is_err());

        let mut params = sim_params();
        params.cycle_period_s = 0.0;
        assert!(SimWorld::new(params).is_err());
    }

    #[test]
    fn test_ray_casts() {
        let world = SimWorld::new(sim_params()).unwrap();
        let start = Vector3::new(0.0, 0.0, 20.0);

        // Static obstacle on both channels
        let hit = world
            .cast_ray(start, Vector3::new(2000.0, 0.0, 20.0), TraceChannel::WorldStatic)
            .unwrap();
        assert!((hit.distance - 900.0).abs() < 1e-9);
        assert!((hit.impact_point - Vector3::new(900.0, 0.0, 20.0)).norm() < 1e-9);

        // The rival at 500 wu is only seen on the avoidance channel
        let hit = world
            .cast_ray(start, Vector3::new(2000.0, 0.0, 20.0), TraceChannel::VehicleAvoidance)
            .unwrap();
        assert!((hit.distance - 350.0).abs() < 1e-9);

        // Short of the obstacle, and pointing away
        assert!(world
            .cast_ray(start, Vector3::new(300.0, 0.0, 20.0), TraceChannel::WorldStatic)
            .is_none());
        assert!(world
            .cast_ray(start, Vector3::new(0.0, -2000.0, 20.0), TraceChannel::WorldStatic)
            .is_none());
    }

    #[test]
    fn test_perception() {
        let mut world = SimWorld::new(sim_params()).unwrap();

        // First cycle perceives, only the near rival is in range
        let perceived = world.perceive(0.25).unwrap();
        assert_eq!(perceived.len(), 1);
        assert_eq!(perceived[0].id(), 10);
        assert!(perceived[0].movement_control().is_some());

        assert!(world.perceive(0.25).is_none());
        assert!(world.perceive(0.25).is_some());
    }

    #[test]
    fn test_step() {
        let mut world = SimWorld::new(sim_params()).unwrap();
        let rival = world.perceive(0.05).unwrap().remove(0);
        let rival_start = rival.pose().position;

        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(1.0, 0.0);
        for _ in 0..20 {
            world.step(0.05, &cmd);
        }

        // 36 km/h is 1000 wu/s
        assert!((rival.pose().position.x - rival_start.x - 1000.0).abs() < 1e-6);
        assert!(world.vehicle_state().speed_kmh > 0.0);
        assert!(world.vehicle_state().position().x > 0.0);
        assert!((world.time_s() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_collision() {
        let mut params = sim_params();
        params.vehicle.start_position = [700.0, 0.0];
        let mut world = SimWorld::new(params).unwrap();

        let mut cmd = ActuatorCommand::default();
        cmd.set_throttle_and_brake(1.0, 0.0);
        for _ in 0..200 {
            world.step(0.05, &cmd);
        }

        // Obstacle radius plus body radius keeps the vehicle short of x = 800
        let x = world.vehicle_state().position().x;
        assert!(x > 700.0);
        assert!(x < 800.0);
    }

    #[test]
    fn test_shipped_params() {
        let params: SimParams =
            util::params::from_str(include_str!("../../../params/sim.toml")).unwrap();
        assert_eq!(params.rivals.len(), 2);
        assert_eq!(params.obstacles.len(), 2);

        let world = SimWorld::new(params).unwrap();
        assert!(world.curve().length() > 0.0);
    }
}
