//! # Reference curve
//!
//! The path a vehicle follows is an opaque curve parametrised by a *key*. Integer keys are the
//! curve's control points, and keys wrap modulo the number of points so that a closed track can
//! be lapped indefinitely.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use util::maths::wrap;

use super::geom::{flatten, safe_normal, SMALL_LENGTH};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A queryable reference path.
///
/// All key inputs may lie outside `[0, num_points())`, implementations shall wrap them.
pub trait RefCurve {
    /// Number of control points in the curve.
    fn num_points(&self) -> usize;

    /// Position on the curve at the given key.
    fn point_at(&self, key: f64) -> Vector3<f64>;

    /// Unit tangent of the curve at the given key.
    fn forward_vector_at(&self, key: f64) -> Vector3<f64>;

    /// Unit vector to the right of the curve at the given key, i.e. `forward × up`.
    fn right_vector_at(&self, key: f64) -> Vector3<f64>;

    /// Distance along the curve from its start to the given key.
    fn distance_along_at(&self, key: f64) -> f64;

    /// Key at the given distance along the curve. Distances wrap around the curve's length.
    fn key_at_distance(&self, distance: f64) -> f64;

    /// Key of the point on the curve closest to `position`.
    fn key_closest_to(&self, position: &Vector3<f64>) -> f64;

    /// Position on the curve at the given distance along it.
    fn point_at_distance(&self, distance: f64) -> Vector3<f64> {
        self.point_at(self.key_at_distance(distance))
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A closed loop of straight segments joining the control points in order, the last point joining
/// back onto the first.
#[derive(Debug, Clone)]
pub struct PolylineCurve {
    points: Vec<Vector3<f64>>,

    /// Distance along the curve at each control point, with the full loop length appended.
    cumulative: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CurveError {
    #[error("A curve needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("Curve segment starting at point {0} has zero length")]
    ZeroLengthSegment(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PolylineCurve {
    /// Create a new closed curve through the given points.
    pub fn new(points: Vec<Vector3<f64>>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints(points.len()));
        }

        let mut cumulative = Vec::with_capacity(points.len() + 1);
        cumulative.push(0.0);

        for i in 0..points.len() {
            let length = (points[(i + 1) % points.len()] - points[i]).norm();
            if length < SMALL_LENGTH {
                return Err(CurveError::ZeroLengthSegment(i));
            }
            cumulative.push(cumulative[i] + length);
        }

        Ok(Self { points, cumulative })
    }

    /// Total length of the loop.
    pub fn length(&self) -> f64 {
        self.cumulative[self.points.len()]
    }

    /// Split a key into a segment index and the fraction along that segment.
    fn segment(&self, key: f64) -> (usize, f64) {
        let key = wrap(key, self.points.len() as f64);
        let index = (key.floor() as usize).min(self.points.len() - 1);
        (index, key - index as f64)
    }

    fn segment_end(&self, index: usize) -> Vector3<f64> {
        self.points[(index + 1) % self.points.len()]
    }
}

impl RefCurve for PolylineCurve {
    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn point_at(&self, key: f64) -> Vector3<f64> {
        let (i, t) = self.segment(key);
        self.points[i] + (self.segment_end(i) - self.points[i]) * t
    }

    fn forward_vector_at(&self, key: f64) -> Vector3<f64> {
        let (i, _) = self.segment(key);
        safe_normal(&(self.segment_end(i) - self.points[i]))
    }

    fn right_vector_at(&self, key: f64) -> Vector3<f64> {
        let forward = flatten(&self.forward_vector_at(key));
        safe_normal(&forward.cross(&Vector3::new(0.0, 0.0, 1.0)))
    }

    fn distance_along_at(&self, key: f64) -> f64 {
        let (i, t) = self.segment(key);
        self.cumulative[i] + t * (self.cumulative[i + 1] - self.cumulative[i])
    }

    fn key_at_distance(&self, distance: f64) -> f64 {
        let distance = wrap(distance, self.length());

        // Index of the last control point at or before the distance
        let i = match self
            .cumulative
            .binary_search_by(|c| c.partial_cmp(&distance).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(i) => i,
            Err(i) => i - 1,
        }
        .min(self.points.len() - 1);

        let seg_length = self.cumulative[i + 1] - self.cumulative[i];
        i as f64 + (distance - self.cumulative[i]) / seg_length
    }

    fn key_closest_to(&self, position: &Vector3<f64>) -> f64 {
        let mut best_key = 0.0;
        let mut best_dist_sq = std::f64::INFINITY;

        for i in 0..self.points.len() {
            let start = self.points[i];
            let seg = self.segment_end(i) - start;

            // Project onto the segment, clamping to its ends
            let t = ((position - start).dot(&seg) / seg.norm_squared()).max(0.0).min(1.0);
            let dist_sq = (start + seg * t - position).norm_squared();

            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best_key = i as f64 + t;
            }
        }

        wrap(best_key, self.points.len() as f64)
    }
}
