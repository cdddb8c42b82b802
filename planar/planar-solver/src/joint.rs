//! Contact joints and their limiters.
//!
//! A [`ContactJoint`] is the persistent, per-contact record the solver keeps
//! between frames. It carries two limiters: one unilateral constraint along
//! the contact normal and one friction constraint along the tangent. Each
//! [`Limiter`] is one scalar constraint row with its own accumulated
//! Lagrange multiplier; the accumulated impulses are the only state that
//! must survive the frame boundary, because they seed the next frame's warm
//! start.

use nalgebra::Vector2;
use planar_types::BodyId;

/// One scalar constraint row at a contact.
///
/// The projector pair maps body velocities onto the constraint direction;
/// the composite-mass vectors are the projectors pre-scaled by the bodies'
/// inverse mass properties, so applying an impulse is pure multiply-add.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Limiter {
    /// Constraint direction applied to the first body.
    pub normal_projector1: Vector2<f32>,
    /// Constraint direction applied to the second body.
    pub normal_projector2: Vector2<f32>,
    /// Angular projector for the first body (2D cross of projector and lever arm).
    pub angular_projector1: f32,
    /// Angular projector for the second body.
    pub angular_projector2: f32,
    /// Linear response of the first body per unit impulse.
    pub comp_mass1_linear: Vector2<f32>,
    /// Linear response of the second body per unit impulse.
    pub comp_mass2_linear: Vector2<f32>,
    /// Angular response of the first body per unit impulse.
    pub comp_mass1_angular: f32,
    /// Angular response of the second body per unit impulse.
    pub comp_mass2_angular: f32,
    /// Inverse of the composite mass along the constraint direction; zero
    /// when both bodies are static, which silently disables the row.
    pub comp_inv_mass: f32,
    /// Accumulated impulse, warm-started across frames.
    pub accumulated_impulse: f32,
}

impl Limiter {
    /// Build the projectors and composite masses for one constraint row.
    ///
    /// `n1`/`n2` are the constraint directions for each body and `w1`/`w2`
    /// the lever arms from each body's origin to the constraint anchor.
    /// The accumulated impulse is left at zero; callers that warm-start
    /// preserve it separately.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        n1: Vector2<f32>,
        n2: Vector2<f32>,
        w1: Vector2<f32>,
        w2: Vector2<f32>,
        inv_mass1: f32,
        inv_inertia1: f32,
        inv_mass2: f32,
        inv_inertia2: f32,
    ) -> Self {
        let angular_projector1 = n1.x * w1.y - n1.y * w1.x;
        let angular_projector2 = n2.x * w2.y - n2.y * w2.x;

        let comp_mass1_linear = n1 * inv_mass1;
        let comp_mass2_linear = n2 * inv_mass2;
        let comp_mass1_angular = angular_projector1 * inv_inertia1;
        let comp_mass2_angular = angular_projector2 * inv_inertia2;

        let comp_mass1 = n1.dot(&comp_mass1_linear) + angular_projector1 * comp_mass1_angular;
        let comp_mass2 = n2.dot(&comp_mass2_linear) + angular_projector2 * comp_mass2_angular;
        let comp_mass = comp_mass1 + comp_mass2;

        let comp_inv_mass = if comp_mass.abs() > 0.0 {
            1.0 / comp_mass
        } else {
            0.0
        };

        Self {
            normal_projector1: n1,
            normal_projector2: n2,
            angular_projector1,
            angular_projector2,
            comp_mass1_linear,
            comp_mass2_linear,
            comp_mass1_angular,
            comp_mass2_angular,
            comp_inv_mass,
            accumulated_impulse: 0.0,
        }
    }
}

/// The unilateral constraint along the contact normal.
///
/// Extends [`Limiter`] with the velocity target and the displacement-pass
/// state. The displacement impulse is deliberately *not* warm-started:
/// position correction is a per-frame remedy for accumulated drift, not a
/// physical momentum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalLimiter {
    /// The underlying constraint row.
    pub limiter: Limiter,
    /// Target relative velocity along the normal.
    pub dst_velocity: f32,
    /// Target displacing velocity for the position-correction pass.
    pub dst_displacing_velocity: f32,
    /// Accumulated displacement impulse; reset at every refresh.
    pub accumulated_displacing_impulse: f32,
}

/// Persistent per-contact joint state.
///
/// Bodies are referenced by index so the packed form can gather them; the
/// contact point index addresses the collision system's contact array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactJoint {
    /// Index of the first body.
    pub body1_index: u32,
    /// Index of the second body.
    pub body2_index: u32,
    /// Index into the contact point array.
    pub contact_point_index: u32,
    /// Non-penetration constraint.
    pub normal_limiter: NormalLimiter,
    /// Coulomb friction constraint along the contact tangent.
    pub friction_limiter: Limiter,
}

impl ContactJoint {
    /// Create a joint for a newly detected contact.
    ///
    /// Limiter geometry starts zeroed; the solver recomputes it from body
    /// poses during refresh, before any iteration reads it.
    #[must_use]
    pub fn new(body1: BodyId, body2: BodyId, contact_point_index: u32) -> Self {
        Self {
            body1_index: body1.raw(),
            body2_index: body2.raw(),
            contact_point_index,
            normal_limiter: NormalLimiter::default(),
            friction_limiter: Limiter::default(),
        }
    }

    /// The first body's ID.
    #[must_use]
    pub fn body1(&self) -> BodyId {
        BodyId::new(self.body1_index)
    }

    /// The second body's ID.
    #[must_use]
    pub fn body2(&self) -> BodyId {
        BodyId::new(self.body2_index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_build_limiter_unit_masses() {
        let n = Vector2::new(0.0, 1.0);
        let limiter = Limiter::build(
            n,
            -n,
            Vector2::new(0.0, -4.0),
            Vector2::zeros(),
            1.0,
            1.0,
            0.0,
            0.0,
        );

        // Lever arm parallel to the normal: no angular coupling, and the
        // composite mass reduces to the first body's inverse mass.
        assert_relative_eq!(limiter.angular_projector1, 0.0, epsilon = 1e-6);
        assert_relative_eq!(limiter.comp_inv_mass, 1.0, epsilon = 1e-6);
        assert_eq!(limiter.comp_mass2_linear, Vector2::zeros());
    }

    #[test]
    fn test_build_limiter_angular_coupling() {
        let n = Vector2::new(0.0, 1.0);
        let w1 = Vector2::new(2.0, 0.0);
        let limiter = Limiter::build(n, -n, w1, Vector2::zeros(), 1.0, 0.5, 0.0, 0.0);

        // K = n.(m1 n) + a1 (I1 a1) with a1 = n x w1 = -2
        assert_relative_eq!(limiter.angular_projector1, -2.0, epsilon = 1e-6);
        assert_relative_eq!(limiter.comp_inv_mass, 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_build_limiter_static_static_disables_row() {
        let n = Vector2::new(1.0, 0.0);
        let limiter = Limiter::build(
            n,
            -n,
            Vector2::new(0.0, 1.0),
            Vector2::new(0.0, -1.0),
            0.0,
            0.0,
            0.0,
            0.0,
        );

        assert_eq!(limiter.comp_inv_mass, 0.0);
        assert_eq!(limiter.comp_mass1_linear, Vector2::zeros());
        assert_eq!(limiter.comp_mass1_angular, 0.0);
    }

    #[test]
    fn test_joint_body_ids() {
        let joint = ContactJoint::new(BodyId::new(3), BodyId::new(7), 11);
        assert_eq!(joint.body1(), BodyId::new(3));
        assert_eq!(joint.body2(), BodyId::new(7));
        assert_eq!(joint.contact_point_index, 11);
        assert_eq!(joint.normal_limiter.limiter.accumulated_impulse, 0.0);
    }
}
