//! # Geometry helpers
//!
//! Headings are yaw angles about world +Z in degrees, positive counter-clockwise, matching
//! [`Pose::heading_deg`](drive_if::vehicle::Pose::heading_deg).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Unit, UnitQuaternion, Vector3};
use util::maths::get_ang_dist_deg;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Vectors shorter than this are treated as zero length.
pub const SMALL_LENGTH: f64 = 1e-8;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Heading of a vector projected onto the horizontal plane.
///
/// A vertical or zero vector has a heading of zero.
pub fn heading_deg(v: &Vector3<f64>) -> f64 {
    if v.x == 0.0 && v.y == 0.0 {
        return 0.0;
    }

    v.y.atan2(v.x).to_degrees()
}

/// Heading of the line of sight from `from` to `to`.
pub fn look_at_heading_deg(from: &Vector3<f64>, to: &Vector3<f64>) -> f64 {
    heading_deg(&(to - from))
}

/// Signed yaw change needed to turn from heading `from_deg` to heading `to_deg`, in (-180, 180].
pub fn yaw_delta_deg(to_deg: f64, from_deg: f64) -> f64 {
    get_ang_dist_deg(to_deg, from_deg)
}

/// Drop the vertical component of a vector.
pub fn flatten(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, v.y, 0.0)
}

/// Normalise a vector, returning the zero vector for degenerate input instead of NaNs.
pub fn safe_normal(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(SMALL_LENGTH).unwrap_or_else(Vector3::zeros)
}

/// Rotate `v` about `axis` by `angle_deg`, following the right hand rule.
///
/// A degenerate axis leaves the vector unchanged.
pub fn rotate_about(v: &Vector3<f64>, axis: &Vector3<f64>, angle_deg: f64) -> Vector3<f64> {
    match Unit::try_new(*axis, SMALL_LENGTH) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle_deg.to_radians()) * *v,
        None => *v,
    }
}

/// Linear interpolation between two vectors.
pub fn lerp_vec(a: &Vector3<f64>, b: &Vector3<f64>, alpha: f64) -> Vector3<f64> {
    a + (b - a) * alpha
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_vec_eq(a: Vector3<f64>, b: Vector3<f64>) {
        assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_headings() {
        assert_eq!(heading_deg(&Vector3::new(1.0, 0.0, 5.0)), 0.0);
        assert!((heading_deg(&Vector3::new(0.0, 1.0, 0.0)) - 90.0).abs() < 1e-12);
        assert_eq!(heading_deg(&Vector3::new(0.0, 0.0, 1.0)), 0.0);

        let from = Vector3::new(10.0, 10.0, 0.0);
        let to = Vector3::new(0.0, 10.0, 3.0);
        assert!((look_at_heading_deg(&from, &to) - 180.0).abs() < 1e-12);

        assert_eq!(yaw_delta_deg(-170.0, 170.0), 20.0);
        assert_eq!(yaw_delta_deg(45.0, 0.0), 45.0);
    }

    #[test]
    fn test_safe_normal() {
        assert_vec_eq(safe_normal(&Vector3::new(3.0, 4.0, 0.0)), Vector3::new(0.6, 0.8, 0.0));
        assert_eq!(safe_normal(&Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn test_rotate_about() {
        let right = Vector3::new(0.0, -1.0, 0.0);
        let up = Vector3::new(0.0, 0.0, 1.0);

        assert_vec_eq(rotate_about(&right, &up, 90.0), Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(rotate_about(&right, &up, 180.0), Vector3::new(0.0, 1.0, 0.0));
        assert_vec_eq(rotate_about(&right, &Vector3::zeros(), 90.0), right);
    }
}
