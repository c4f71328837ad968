//! # Vehicle library.
//!
//! This library allows other crates in the workspace (and the benches) to access items defined
//! inside the vehicle crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - target tracking, path following and obstacle avoidance
pub mod auto;

/// Simulation module - a closed loop kinematic world for driving the autonomy
pub mod sim;
