//! # DriveMgr parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::auto::{
    obstacle_avoid::ObstacleAvoidParams,
    path_follow::{DriveStyle, PathFollowParams},
    target_tracker::TargetTrackerParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the [`DriveMgr`](super::DriveMgr) and all its controllers, one table per
/// controller in the parameter file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriveMgrParams {
    pub target_tracker: TargetTrackerParams,

    pub path_follow: PathFollowParams,

    pub obstacle_avoid: ObstacleAvoidParams,

    #[serde(default)]
    pub drive_style: DriveStyle,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_parse() {
        let params: DriveMgrParams =
            util::params::from_str(include_str!("../../../../params/drive_mgr.toml")).unwrap();

        assert!(params.target_tracker.use_avoidance);
        assert_eq!(params.target_tracker.deacquire_distance, 400.0);
        assert_eq!(params.path_follow.start_distance_threshold, 1000.0);
        assert_eq!(params.path_follow.stuck_time_s, 1.5);
        assert_eq!(params.path_follow.throttle_by_path_distance.eval(0.0), 1.0);
        assert_eq!(params.obstacle_avoid.clear_time_s, 0.5);
        assert_eq!(params.obstacle_avoid.steering_angle_range_deg, 60.0);
    }

    #[test]
    fn test_missing_section_rejected() {
        let res: Result<DriveMgrParams, _> = util::params::from_str("[drive_style]\nmax_speed_delta_kmh = 5.0\n");
        assert!(res.is_err());
    }
}
