//! # Lookup tables
//!
//! Tuning curves such as "maximum throttle against distance to the path" are given as piecewise
//! linear lookup tables. In parameter files a table is written as a list of `[x, y]` pairs with
//! strictly increasing `x`:
//!
//! ```toml
//! throttle_by_path_distance = [[0.0, 1.0], [300.0, 0.6], [800.0, 0.3]]
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use util::maths::map_range_clamped;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A piecewise linear function `f: x -> y`, constant beyond its first and last keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Lut {
    keys: Vec<[f64; 2]>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LutError {
    #[error("A lookup table must have at least one key")]
    Empty,

    #[error("Lookup table keys must have strictly increasing x values, key {0} does not")]
    NotIncreasing(usize),

    #[error("Lookup table key {0} is not finite")]
    NotFinite(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Lut {
    /// Build a new table from `[x, y]` keys.
    pub fn new(keys: Vec<[f64; 2]>) -> Result<Self, LutError> {
        if keys.is_empty() {
            return Err(LutError::Empty);
        }

        for (i, k) in keys.iter().enumerate() {
            if !k[0].is_finite() || !k[1].is_finite() {
                return Err(LutError::NotFinite(i));
            }
            if i > 0 && k[0] <= keys[i - 1][0] {
                return Err(LutError::NotIncreasing(i));
            }
        }

        Ok(Self { keys })
    }

    /// A table which always evaluates to `y`.
    pub fn constant(y: f64) -> Self {
        Self {
            keys: vec![[0.0, y]],
        }
    }

    /// Evaluate the table at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let first = self.keys[0];
        if x <= first[0] {
            return first[1];
        }

        // Find the first key beyond x, interpolating between it and the one before
        match self.keys.iter().position(|k| k[0] > x) {
            Some(i) => {
                let (k0, k1) = (self.keys[i - 1], self.keys[i]);
                map_range_clamped((k0[0], k1[0]), (k0[1], k1[1]), x)
            }
            None => self.keys[self.keys.len() - 1][1],
        }
    }
}

impl TryFrom<Vec<[f64; 2]>> for Lut {
    type Error = LutError;

    fn try_from(keys: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<Lut> for Vec<[f64; 2]> {
    fn from(lut: Lut) -> Self {
        lut.keys
    }
}
