//! Contact point data.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One point of contact between two bodies, captured by collision detection.
///
/// Offsets are world-space vectors from each body's origin to the contact
/// point at capture time; the solver re-anchors them against current body
/// poses every frame. The normal is a unit vector pointing from the second
/// body into the first.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPoint {
    /// Offset from the first body's origin to the contact point.
    pub delta1: Vector2<f32>,
    /// Offset from the second body's origin to the contact point.
    pub delta2: Vector2<f32>,
    /// Unit contact normal, pointing from the second body into the first.
    pub normal: Vector2<f32>,
    /// Whether this point was created this frame. Informational only; the
    /// solver does not read it.
    pub is_newly_created: bool,
}

impl ContactPoint {
    /// Create a freshly detected contact point.
    #[must_use]
    pub fn new(delta1: Vector2<f32>, delta2: Vector2<f32>, normal: Vector2<f32>) -> Self {
        Self {
            delta1,
            delta2,
            normal,
            is_newly_created: true,
        }
    }
}
