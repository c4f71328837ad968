//! # Autonomy Module
//!
//! This module provides the per-tick navigation and control of a vehicle. Three controllers share
//! the vehicle's actuators:
//!
//! - [`TargetTracker`] - tracks the closest competitor and biases steering and braking away from
//!   it through the modifier channels.
//! - [`PathFollower`] - drives along the reference curve, recovering when stuck.
//! - [`ObstacleAvoider`] - sweeps around the vehicle and steers away from the nearest obstacle,
//!   overriding the path follower while active.
//!
//! The [`DriveMgr`] owns one instance of each and arbitrates between them.

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use drive_mgr::{DriveInput, DriveMgr, DriveMgrError, DriveMgrParams, DriveMode, DriveOutput};
pub use obstacle_avoid::ObstacleAvoider;
pub use path_follow::PathFollower;
pub use target_tracker::TargetTracker;

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Geometry helpers - headings, bearings and vector utilities
pub mod geom;

/// Reference curve abstraction and a polyline implementation
pub mod curve;

/// Piecewise linear lookup tables
pub mod lut;

/// Target tracking and proximity avoidance
pub mod target_tracker;

/// Path following with stuck recovery
pub mod path_follow;

/// Radial obstacle avoidance
pub mod obstacle_avoid;

/// Per-vehicle arbitration between the controllers
pub mod drive_mgr;
