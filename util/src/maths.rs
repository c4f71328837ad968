//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another, clamping the value to the source range first so the
/// result never leaves the target range.
///
/// The target range may be decreasing, e.g. `(1.0, 0.0)` gives a ramp that is maximal at the
/// start of the source range. If the source range is empty the result is the end of the target
/// range for values at or beyond the source, and the start otherwise.
pub fn map_range_clamped<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    let zero = T::zero();
    let one = T::one();

    let width = source_range.1 - source_range.0;
    let pct = if width == zero {
        if value >= source_range.1 {
            one
        } else {
            zero
        }
    } else {
        clamp(&((value - source_range.0) / width), &zero, &one)
    };

    lerp(target_range.0, target_range.1, pct)
}

/// Linear interpolation between `a` and `b` with `alpha` in `[0, 1]`.
pub fn lerp<T>(a: T, b: T, alpha: T) -> T
where
    T: Float,
{
    a + alpha * (b - a)
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Sign of a value, returning zero for zero (unlike `f64::signum`).
pub fn sign<T>(value: T) -> T
where
    T: Float,
{
    if value > T::zero() {
        T::one()
    } else if value < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Move `current` towards `target` at a rate proportional to the remaining distance.
///
/// `speed` is the interpolation rate in 1/seconds. A non-positive speed jumps straight to the
/// target, as does a remaining distance which is too small to matter.
pub fn interp_to<T>(current: T, target: T, dt: T, speed: T) -> T
where
    T: Float,
{
    if speed <= T::zero() {
        return target;
    }

    let dist = target - current;
    let small = T::from(1e-8).unwrap_or_else(T::epsilon);
    if dist * dist < small {
        return target;
    }

    current + dist * clamp(&(dt * speed), &T::zero(), &T::one())
}

/// Normalise an angle in degrees into the range (-180, 180].
pub fn norm_angle_deg<T>(angle_deg: T) -> T
where
    T: Float,
{
    let half = T::from(180.0).unwrap_or_else(T::zero);
    let full = half + half;

    let r = rem_euclid(angle_deg + half, full) - half;

    // rem_euclid can round to exactly `full`, and -180 is outside the range
    if r <= -half {
        r + full
    } else if r > half {
        r - full
    } else {
        r
    }
}

/// Get the signed angular distance between two angles in degrees, i.e. the angle that must be
/// added to `from` to reach `to`, in the range (-180, 180].
pub fn get_ang_dist_deg<T>(to: T, from: T) -> T
where
    T: Float,
{
    norm_angle_deg(to - from)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap a value into `[0, modulus)`.
///
/// Unlike [`rem_euclid`] the result is guaranteed to be strictly less than the modulus. A
/// non-positive modulus gives zero.
pub fn wrap<T>(value: T, modulus: T) -> T
where
    T: Float,
{
    if modulus <= T::zero() {
        return T::zero();
    }

    let r = rem_euclid(value, modulus);
    if r >= modulus {
        T::zero()
    } else {
        r
    }
}
