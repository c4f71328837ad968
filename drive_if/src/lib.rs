//! # Drive interface crate.
//!
//! Provides the interfaces between the vehicle control core and its external collaborators: the
//! simulation providing the vehicle state and applying actuator demands, the perception feed, and
//! the scene query (raycast) service.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator demands and the sink they are written to
pub mod actuator;

/// Perceived actors and their capabilities
pub mod perception;

/// Scene queries (raycasts)
pub mod scene;

/// Lifecycle status of a per-tick task
pub mod task;

/// Vehicle pose and state
pub mod vehicle;
