//! # Perception interface
//!
//! The perception subsystem reports an ordered list of the actors currently visible to a vehicle.
//! Actors are shared handles so that a controller can keep following an actor's live pose between
//! perception updates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::rc::Rc;

use crate::vehicle::{ActorId, Pose};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An actor seen by the perception subsystem.
pub trait PerceivedActor {
    /// Unique identifier of the actor.
    fn id(&self) -> ActorId;

    /// Current pose of the actor.
    fn pose(&self) -> Pose;

    /// Capability query for the actor's movement control.
    ///
    /// Only actors which are driven (vehicles) return `Some`. Static props and pedestrians return
    /// `None`.
    fn movement_control(&self) -> Option<MovementHandle>;
}

/// Read access to the movement of a driven actor.
pub trait MovementControl {
    /// Forward speed of the actor.
    ///
    /// Units: kilometers/hour
    fn speed_kmh(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Shared handle to a perceived actor.
pub type ActorHandle = Rc<dyn PerceivedActor>;

/// Shared handle to an actor's movement control.
pub type MovementHandle = Rc<dyn MovementControl>;
