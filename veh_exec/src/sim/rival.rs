//! # Scripted rivals
//!
//! Rival vehicles drive the track at a constant speed, exactly on the curve. They are shared with
//! the perception feed as actor handles, so the drive manager always sees their live pose.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::Cell, rc::Rc};

use drive_if::{
    perception::{MovementControl, MovementHandle, PerceivedActor},
    vehicle::{ActorId, Pose},
};

use super::params::RivalParams;
use crate::auto::{
    curve::{PolylineCurve, RefCurve},
    geom::heading_deg,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimRival {
    params: RivalParams,

    curve: Rc<PolylineCurve>,

    /// Distance travelled along the track.
    distance: Cell<f64>,

    movement: Rc<RivalMovement>,
}

pub struct RivalMovement {
    speed_kmh: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimRival {
    pub fn new(params: RivalParams, curve: Rc<PolylineCurve>) -> Self {
        Self {
            distance: Cell::new(params.start_distance),
            movement: Rc::new(RivalMovement {
                speed_kmh: params.speed_kmh,
            }),
            params,
            curve,
        }
    }

    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    /// Drive along the track for `dt` seconds.
    pub fn step(&self, dt: f64, wu_per_m: f64) {
        let travelled = self.params.speed_kmh / 3.6 * wu_per_m * dt;
        self.distance.set(self.distance.get() + travelled);
    }
}

impl PerceivedActor for SimRival {
    fn id(&self) -> ActorId {
        self.params.id
    }

    fn pose(&self) -> Pose {
        let key = self.curve.key_at_distance(self.distance.get());

        Pose::from_heading_deg(
            self.curve.point_at(key),
            heading_deg(&self.curve.forward_vector_at(key)),
        )
    }

    fn movement_control(&self) -> Option<MovementHandle> {
        let movement: MovementHandle = self.movement.clone();
        Some(movement)
    }
}

impl MovementControl for RivalMovement {
    fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }
}
