//! Rigid body state types.
//!
//! A body is described by its pose ([`Coords`]), linear and angular
//! velocity, a second *displacing* velocity pair used only for position
//! correction, and inverse mass properties. Inverse mass is the native
//! representation: a static body is simply one whose inverse mass and
//! inverse inertia are both zero, which makes it immovable by construction
//! because every impulse is scaled by them.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a rigid body within the body sequence passed to a solve call.
///
/// Bodies are addressed by dense index, never by reference: the solver's
/// gathered loads need plain integer lanes, and index-based addressing keeps
/// body storage and joint storage decoupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u32);

impl BodyId {
    /// Create a new body ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as a `usize` for slice addressing.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BodyId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Position and orientation of a body in world space.
///
/// Orientation is stored as explicit basis vectors (`x_vector`, `y_vector`)
/// rather than an angle, so transforming points is pure multiply-add.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coords {
    /// Origin of the body frame in world coordinates.
    pub pos: Vector2<f32>,
    /// World-space direction of the body's local X axis.
    pub x_vector: Vector2<f32>,
    /// World-space direction of the body's local Y axis.
    pub y_vector: Vector2<f32>,
}

impl Default for Coords {
    fn default() -> Self {
        Self::identity()
    }
}

impl Coords {
    /// Identity pose at the origin.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            pos: Vector2::zeros(),
            x_vector: Vector2::new(1.0, 0.0),
            y_vector: Vector2::new(0.0, 1.0),
        }
    }

    /// Create a pose from a position and a rotation angle in radians.
    #[must_use]
    pub fn from_angle(pos: Vector2<f32>, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            pos,
            x_vector: Vector2::new(cos, sin),
            y_vector: Vector2::new(-sin, cos),
        }
    }

    /// Transform a point from body-local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: Vector2<f32>) -> Vector2<f32> {
        self.pos + self.x_vector * local.x + self.y_vector * local.y
    }

    /// Transform a vector from body-local to world coordinates (no translation).
    #[must_use]
    pub fn transform_vector(&self, local: Vector2<f32>) -> Vector2<f32> {
        self.x_vector * local.x + self.y_vector * local.y
    }

    /// Check that every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pos.iter().all(|x| x.is_finite())
            && self.x_vector.iter().all(|x| x.is_finite())
            && self.y_vector.iter().all(|x| x.is_finite())
    }
}

/// A 2D rigid body as seen by the contact solver.
///
/// The solver mutates `velocity`, `angular_velocity`, and the displacing
/// pair; it reads everything else. The displacing velocities are a
/// fictitious motion whose integration yields position correction without
/// injecting energy into the real velocities.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// Pose of the body.
    pub coords: Coords,
    /// Linear velocity in world space.
    pub velocity: Vector2<f32>,
    /// Angular velocity (counter-clockwise positive).
    pub angular_velocity: f32,
    /// Linear displacing velocity, consumed by position correction only.
    pub displacing_velocity: Vector2<f32>,
    /// Angular displacing velocity, consumed by position correction only.
    pub displacing_angular_velocity: f32,
    /// Inverse mass; zero for static bodies.
    pub inv_mass: f32,
    /// Inverse moment of inertia; zero for static bodies.
    pub inv_inertia: f32,
}

impl RigidBody {
    /// Create a body at rest with the given inverse mass properties.
    #[must_use]
    pub fn new(coords: Coords, inv_mass: f32, inv_inertia: f32) -> Self {
        Self {
            coords,
            velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            displacing_velocity: Vector2::zeros(),
            displacing_angular_velocity: 0.0,
            inv_mass,
            inv_inertia,
        }
    }

    /// Create a dynamic box body of unit density from its half extents.
    #[must_use]
    pub fn dynamic_box(coords: Coords, half_extents: Vector2<f32>) -> Self {
        debug_assert!(half_extents.x > 0.0 && half_extents.y > 0.0);

        let mass = 4.0 * half_extents.x * half_extents.y;
        let inertia =
            mass * (half_extents.x * half_extents.x + half_extents.y * half_extents.y) / 3.0;

        Self::new(coords, 1.0 / mass, 1.0 / inertia)
    }

    /// Create a static (infinite-mass) body.
    #[must_use]
    pub fn fixed(coords: Coords) -> Self {
        Self::new(coords, 0.0, 0.0)
    }

    /// Whether this body is immovable.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0 && self.inv_inertia == 0.0
    }

    /// Check that every component is finite. The solver expects finite
    /// inputs; callers are responsible for validating body state.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coords.is_finite()
            && self.velocity.iter().all(|x| x.is_finite())
            && self.angular_velocity.is_finite()
            && self.displacing_velocity.iter().all(|x| x.is_finite())
            && self.displacing_angular_velocity.is_finite()
            && self.inv_mass.is_finite()
            && self.inv_inertia.is_finite()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_id_roundtrip() {
        let id = BodyId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "Body(42)");
    }

    #[test]
    fn test_coords_from_angle() {
        let coords = Coords::from_angle(Vector2::new(1.0, 2.0), std::f32::consts::FRAC_PI_2);

        // After a 90 degree rotation, local X points along world Y.
        assert_relative_eq!(coords.x_vector.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(coords.x_vector.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(coords.y_vector.x, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_point() {
        let coords = Coords::from_angle(Vector2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
        let world = coords.transform_point(Vector2::new(1.0, 0.0));

        assert_relative_eq!(world.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(world.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_is_finite_rejects_nan() {
        let mut body = RigidBody::dynamic_box(Coords::identity(), Vector2::new(1.0, 1.0));
        assert!(body.is_finite());

        body.velocity.x = f32::NAN;
        assert!(!body.is_finite());
    }
}
