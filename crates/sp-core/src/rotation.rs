//! Page rotation in quarter turns.
//!
//! The angle is signed and accumulates across rotate actions (rotating left
//! twice gives `-180`, not `180`). Whether rendered width and height swap is
//! decided on the raw angle: `|angle| mod 180 != 0`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(i32);

/// Toolbar rotate buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    pub fn delta(self) -> i32 {
        match self {
            RotateDirection::Left => -90,
            RotateDirection::Right => 90,
        }
    }
}

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// Build from a raw angle; must be a multiple of 90.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(Error::InvalidInput(format!(
                "rotation must be a multiple of 90 degrees, got {degrees}"
            )));
        }
        Ok(Rotation(degrees))
    }

    pub fn degrees(self) -> i32 {
        self.0
    }

    /// Accumulate one quarter turn; `delta` must be `90` or `-90`.
    pub fn rotated(self, delta: i32) -> Result<Self> {
        if delta != 90 && delta != -90 {
            return Err(Error::InvalidInput(format!(
                "rotation step must be 90 or -90 degrees, got {delta}"
            )));
        }
        self.0
            .checked_add(delta)
            .map(Rotation)
            .ok_or_else(|| Error::InvalidInput(format!("rotation {self} cannot turn further")))
    }

    /// Angle folded into `0..360`.
    pub fn normalized(self) -> u16 {
        self.0.rem_euclid(360) as u16
    }

    pub fn swaps_dimensions(self) -> bool {
        self.0.abs() % 180 != 0
    }

    /// Width/height as seen after applying this rotation.
    pub fn apply_to_size(self, width: f64, height: f64) -> (f64, f64) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}
