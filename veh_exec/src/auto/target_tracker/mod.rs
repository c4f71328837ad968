//! # Target tracker
//!
//! The tracker keeps hold of the nearest competitor vehicle reported by perception and nudges the
//! vehicle away from it. It never commands the actuators directly, instead it biases them through
//! the steering and braking modifier channels so that whichever controller currently owns the
//! baseline commands keeps doing so.
//!
//! The steering bias compares the line of sight to the target against the target's own heading
//! (not the vehicle's). A target travelling across the line of sight therefore produces a weak
//! bias, while one driving directly away or directly towards the vehicle produces the strongest.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use drive_if::{
    actuator::ActuatorSink,
    perception::{ActorHandle, MovementHandle},
    vehicle::{ActorId, VehicleState},
};
use log::{debug, info, trace};
use serde::Serialize;
use util::maths::{map_range_clamped, sign};

use super::geom::{look_at_heading_deg, yaw_delta_deg};

pub use params::TargetTrackerParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tracks the nearest perceived vehicle and biases steering and braking away from it.
pub struct TargetTracker {
    params: TargetTrackerParams,

    /// The vehicle which owns this tracker, never selected as a target.
    owner_id: ActorId,

    /// The most recent set of perceived actors, in the order perception reported them.
    perceived: Vec<ActorHandle>,

    target: Option<TrackedTarget>,
}

/// A target actor together with its movement control, which must exist for an actor to be
/// tracked.
struct TrackedTarget {
    actor: ActorHandle,
    movement: MovementHandle,
}

/// Summary of a tracker tick.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TrackerReport {
    pub target_id: Option<ActorId>,

    /// Distance to the target.
    ///
    /// Units: world units
    pub distance: Option<f64>,

    /// Yaw from the target's heading to the line of sight.
    ///
    /// Units: degrees
    pub bearing_error_deg: Option<f64>,

    /// Weight of the steering modifier set this tick, if one was set.
    pub steering_weight: Option<f64>,

    /// Weight of the braking modifier set this tick, if one was set.
    pub braking_weight: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TargetTracker {
    pub fn new(params: TargetTrackerParams, owner_id: ActorId) -> Self {
        Self {
            params,
            owner_id,
            perceived: Vec::new(),
            target: None,
        }
    }

    /// Replace the set of perceived actors and select a new target from it.
    ///
    /// Only actors with movement control are candidates, and the owning vehicle is never
    /// selected. Of the candidates the closest one to the vehicle is selected, the first reported
    /// actor winning any tie. A current target missing from the new set is cleared, as is the
    /// target when no candidate remains.
    pub fn update_perceived_actors(
        &mut self,
        actors: Vec<ActorHandle>,
        vehicle: &VehicleState,
        sink: &mut dyn ActuatorSink,
    ) {
        self.perceived = actors;

        if !self.params.use_avoidance {
            return;
        }

        if let Some(id) = self.target_id() {
            if !self.perceived.iter().any(|a| a.id() == id) {
                debug!("Target {} is no longer perceived", id);
                self.clear_target(sink);
            }
        }

        let closest = self.closest_perceived(vehicle);
        self.set_target(closest, sink);
    }

    /// Set the tracked target.
    ///
    /// Passing `None` (or the owning vehicle) clears the target, zeroing the modifier channels if a
    /// target was being tracked. A new actor is only adopted if it exposes movement control,
    /// otherwise the current target is kept.
    pub fn set_target(&mut self, target: Option<ActorHandle>, sink: &mut dyn ActuatorSink) {
        let actor = match target {
            Some(a) if a.id() != self.owner_id => a,
            _ => {
                self.clear_target(sink);
                return;
            }
        };

        if self.target_id() == Some(actor.id()) {
            return;
        }

        match actor.movement_control() {
            Some(movement) => {
                info!("Tracking target {}", actor.id());
                self.target = Some(TrackedTarget { actor, movement });
            }
            None => debug!(
                "Actor {} has no movement control and cannot be tracked",
                actor.id()
            ),
        }
    }

    /// Update the modifier channels for the current target.
    pub fn tick(&mut self, vehicle: &VehicleState, sink: &mut dyn ActuatorSink) -> TrackerReport {
        let mut report = TrackerReport::default();

        if !self.params.use_avoidance {
            return report;
        }

        let (target_id, target_pose) = match self.target {
            Some(ref t) => (t.actor.id(), t.actor.pose()),
            None => return report,
        };

        let distance = (target_pose.position - vehicle.position()).norm();
        report.target_id = Some(target_id);
        report.distance = Some(distance);

        if distance > self.params.deacquire_distance {
            info!(
                "Target {} is {:.1} away, dropping it",
                target_id, distance
            );
            self.clear_target(sink);
            self.perceived.retain(|a| a.id() != target_id);
            return report;
        }

        let look_at_deg = look_at_heading_deg(&vehicle.position(), &target_pose.position);
        let bearing_error_deg = yaw_delta_deg(look_at_deg, target_pose.heading_deg());

        let steering = -sign(bearing_error_deg);
        let distance_weight = map_range_clamped(
            (0.0, self.params.max_avoidance_distance),
            (self.params.max_avoidance_weight, 0.0),
            distance,
        );
        let steering_weight = map_range_clamped(
            (0.0, self.params.max_avoidance_angle_delta_deg),
            (distance_weight, 0.0),
            bearing_error_deg.abs(),
        );

        sink.set_steering_modifier(steering, steering_weight);
        report.bearing_error_deg = Some(bearing_error_deg);
        report.steering_weight = Some(steering_weight);

        if vehicle.speed_kmh > self.params.min_braking_speed_kmh {
            let braking_weight = map_range_clamped(
                (0.0, self.params.max_braking_distance),
                (self.params.max_braking_weight, 0.0),
                distance,
            );
            sink.set_braking_modifier(1.0, braking_weight);
            report.braking_weight = Some(braking_weight);
        }

        trace!(
            "Target {}: dist {:.1}, err {:.1} deg, steer ({}, {:.3})",
            target_id,
            distance,
            bearing_error_deg,
            steering,
            steering_weight
        );

        report
    }

    /// Identifier of the tracked target, if any.
    pub fn target_id(&self) -> Option<ActorId> {
        self.target.as_ref().map(|t| t.actor.id())
    }

    /// Speed of the tracked target, if any.
    ///
    /// Units: kilometers/hour
    pub fn target_speed_kmh(&self) -> Option<f64> {
        self.target.as_ref().map(|t| t.movement.speed_kmh())
    }

    /// The most recently perceived actors.
    pub fn perceived(&self) -> &[ActorHandle] {
        &self.perceived
    }

    fn closest_perceived(&self, vehicle: &VehicleState) -> Option<ActorHandle> {
        let mut closest: Option<(&ActorHandle, f64)> = None;

        let candidates = self
            .perceived
            .iter()
            .filter(|a| a.id() != self.owner_id && a.movement_control().is_some());

        for actor in candidates {
            let distance = (actor.pose().position - vehicle.position()).norm();

            match closest {
                Some((_, d)) if d <= distance => (),
                _ => closest = Some((actor, distance)),
            }
        }

        closest.map(|(a, _)| a.clone())
    }

    fn clear_target(&mut self, sink: &mut dyn ActuatorSink) {
        if let Some(t) = self.target.take() {
            debug!("Target {} cleared", t.actor.id());
            sink.set_steering_modifier(0.0, 0.0);
            sink.set_throttle_modifier(0.0, 0.0);
            sink.set_braking_modifier(0.0, 0.0);
        }
    }
}
