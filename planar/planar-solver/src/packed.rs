//! SoA lane blocks for contact joints.
//!
//! [`ContactJointPacked`] holds the same scalar fields as one
//! [`ContactJoint`](crate::ContactJoint), but each field is an `[f32; N]`
//! lane array so that `N` consecutive joints of the grouped permutation
//! occupy one SIMD batch. Packing scatters the AoS joints into lane slots;
//! unpacking restores only the accumulated impulses, which is the only
//! joint state that outlives a solve (everything else is recomputed by the
//! next refresh).

use crate::joint::{ContactJoint, Limiter};

/// One constraint row for `N` joints, field-major.
#[derive(Debug, Clone, Copy)]
#[repr(C, align(32))]
pub struct LimiterPacked<const N: usize> {
    /// Constraint direction X for the first bodies.
    pub normal_projector1_x: [f32; N],
    /// Constraint direction Y for the first bodies.
    pub normal_projector1_y: [f32; N],
    /// Constraint direction X for the second bodies.
    pub normal_projector2_x: [f32; N],
    /// Constraint direction Y for the second bodies.
    pub normal_projector2_y: [f32; N],
    /// Angular projectors for the first bodies.
    pub angular_projector1: [f32; N],
    /// Angular projectors for the second bodies.
    pub angular_projector2: [f32; N],
    /// Linear response X of the first bodies per unit impulse.
    pub comp_mass1_linear_x: [f32; N],
    /// Linear response Y of the first bodies per unit impulse.
    pub comp_mass1_linear_y: [f32; N],
    /// Linear response X of the second bodies per unit impulse.
    pub comp_mass2_linear_x: [f32; N],
    /// Linear response Y of the second bodies per unit impulse.
    pub comp_mass2_linear_y: [f32; N],
    /// Angular response of the first bodies per unit impulse.
    pub comp_mass1_angular: [f32; N],
    /// Angular response of the second bodies per unit impulse.
    pub comp_mass2_angular: [f32; N],
    /// Inverse composite masses.
    pub comp_inv_mass: [f32; N],
    /// Accumulated impulses.
    pub accumulated_impulse: [f32; N],
}

impl<const N: usize> LimiterPacked<N> {
    /// All lanes zero.
    pub const ZERO: Self = Self {
        normal_projector1_x: [0.0; N],
        normal_projector1_y: [0.0; N],
        normal_projector2_x: [0.0; N],
        normal_projector2_y: [0.0; N],
        angular_projector1: [0.0; N],
        angular_projector2: [0.0; N],
        comp_mass1_linear_x: [0.0; N],
        comp_mass1_linear_y: [0.0; N],
        comp_mass2_linear_x: [0.0; N],
        comp_mass2_linear_y: [0.0; N],
        comp_mass1_angular: [0.0; N],
        comp_mass2_angular: [0.0; N],
        comp_inv_mass: [0.0; N],
        accumulated_impulse: [0.0; N],
    };

    fn pack(&mut self, lane: usize, src: &Limiter) {
        self.normal_projector1_x[lane] = src.normal_projector1.x;
        self.normal_projector1_y[lane] = src.normal_projector1.y;
        self.normal_projector2_x[lane] = src.normal_projector2.x;
        self.normal_projector2_y[lane] = src.normal_projector2.y;
        self.angular_projector1[lane] = src.angular_projector1;
        self.angular_projector2[lane] = src.angular_projector2;
        self.comp_mass1_linear_x[lane] = src.comp_mass1_linear.x;
        self.comp_mass1_linear_y[lane] = src.comp_mass1_linear.y;
        self.comp_mass2_linear_x[lane] = src.comp_mass2_linear.x;
        self.comp_mass2_linear_y[lane] = src.comp_mass2_linear.y;
        self.comp_mass1_angular[lane] = src.comp_mass1_angular;
        self.comp_mass2_angular[lane] = src.comp_mass2_angular;
        self.comp_inv_mass[lane] = src.comp_inv_mass;
        self.accumulated_impulse[lane] = src.accumulated_impulse;
    }
}

impl<const N: usize> Default for LimiterPacked<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

/// The normal limiter's extra lanes on top of [`LimiterPacked`].
#[derive(Debug, Clone, Copy)]
#[repr(C, align(32))]
pub struct NormalLimiterPacked<const N: usize> {
    /// The underlying constraint rows.
    pub limiter: LimiterPacked<N>,
    /// Target relative velocities.
    pub dst_velocity: [f32; N],
    /// Targets for the displacement pass.
    pub dst_displacing_velocity: [f32; N],
    /// Accumulated displacement impulses.
    pub accumulated_displacing_impulse: [f32; N],
}

impl<const N: usize> NormalLimiterPacked<N> {
    /// All lanes zero.
    pub const ZERO: Self = Self {
        limiter: LimiterPacked::ZERO,
        dst_velocity: [0.0; N],
        dst_displacing_velocity: [0.0; N],
        accumulated_displacing_impulse: [0.0; N],
    };
}

impl<const N: usize> Default for NormalLimiterPacked<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

/// `N` contact joints in SoA form.
#[derive(Debug, Clone, Copy)]
#[repr(C, align(32))]
pub struct ContactJointPacked<const N: usize> {
    /// First body index per lane.
    pub body1_index: [u32; N],
    /// Second body index per lane.
    pub body2_index: [u32; N],
    /// Contact point index per lane.
    pub contact_point_index: [u32; N],
    /// Non-penetration rows.
    pub normal_limiter: NormalLimiterPacked<N>,
    /// Friction rows.
    pub friction_limiter: LimiterPacked<N>,
}

impl<const N: usize> ContactJointPacked<N> {
    /// All lanes zero.
    pub const ZERO: Self = Self {
        body1_index: [0; N],
        body2_index: [0; N],
        contact_point_index: [0; N],
        normal_limiter: NormalLimiterPacked::ZERO,
        friction_limiter: LimiterPacked::ZERO,
    };
}

impl<const N: usize> Default for ContactJointPacked<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Scatter one AoS joint into lane slot `lane_index` of the block array.
pub fn pack_joint<const N: usize>(
    blocks: &mut [ContactJointPacked<N>],
    lane_index: usize,
    joint: &ContactJoint,
) {
    let block = &mut blocks[lane_index / N];
    let lane = lane_index % N;

    block.body1_index[lane] = joint.body1_index;
    block.body2_index[lane] = joint.body2_index;
    block.contact_point_index[lane] = joint.contact_point_index;

    block
        .normal_limiter
        .limiter
        .pack(lane, &joint.normal_limiter.limiter);
    block.normal_limiter.dst_velocity[lane] = joint.normal_limiter.dst_velocity;
    block.normal_limiter.dst_displacing_velocity[lane] =
        joint.normal_limiter.dst_displacing_velocity;
    block.normal_limiter.accumulated_displacing_impulse[lane] =
        joint.normal_limiter.accumulated_displacing_impulse;

    block.friction_limiter.pack(lane, &joint.friction_limiter);
}

/// Restore the accumulated impulses of lane slot `lane_index` into an AoS
/// joint. Every other packed field was intermediate.
pub fn unpack_impulses<const N: usize>(
    blocks: &[ContactJointPacked<N>],
    lane_index: usize,
    joint: &mut ContactJoint,
) {
    let block = &blocks[lane_index / N];
    let lane = lane_index % N;

    joint.normal_limiter.limiter.accumulated_impulse =
        block.normal_limiter.limiter.accumulated_impulse[lane];
    joint.normal_limiter.accumulated_displacing_impulse =
        block.normal_limiter.accumulated_displacing_impulse[lane];
    joint.friction_limiter.accumulated_impulse = block.friction_limiter.accumulated_impulse[lane];
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use planar_types::BodyId;

    #[test]
    fn test_lane_arrays_stay_aligned() {
        // Every lane array must start on a lane-width boundary for N <= 8.
        assert_eq!(std::mem::align_of::<ContactJointPacked<8>>(), 32);
        assert_eq!(std::mem::size_of::<ContactJointPacked<8>>() % 32, 0);
        assert_eq!(std::mem::align_of::<ContactJointPacked<4>>(), 32);
    }

    #[test]
    fn test_pack_unpack_accumulated_state() {
        let mut joint = ContactJoint::new(BodyId::new(2), BodyId::new(9), 5);
        joint.normal_limiter.limiter.accumulated_impulse = 3.5;
        joint.normal_limiter.accumulated_displacing_impulse = 0.25;
        joint.friction_limiter.accumulated_impulse = -1.0;

        let mut blocks = vec![ContactJointPacked::<4>::ZERO; 2];
        pack_joint(&mut blocks, 6, &joint);

        assert_eq!(blocks[1].body1_index[2], 2);
        assert_eq!(blocks[1].body2_index[2], 9);
        assert_eq!(blocks[1].contact_point_index[2], 5);
        assert_eq!(blocks[1].normal_limiter.limiter.accumulated_impulse[2], 3.5);

        let mut restored = ContactJoint::new(BodyId::new(2), BodyId::new(9), 5);
        unpack_impulses(&blocks, 6, &mut restored);

        assert_eq!(restored.normal_limiter.limiter.accumulated_impulse, 3.5);
        assert_eq!(restored.normal_limiter.accumulated_displacing_impulse, 0.25);
        assert_eq!(restored.friction_limiter.accumulated_impulse, -1.0);
    }
}
