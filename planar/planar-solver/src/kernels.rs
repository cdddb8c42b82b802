//! Width-generic solver kernels.
//!
//! Each kernel processes a lane range of packed joint blocks at batch width
//! `VN`, which is either the block width `N` (the grouped prefix, one block
//! per step) or 1 (the scalar tail, one lane per step). Both instantiations
//! run the same arithmetic, so the batch/tail split cannot change results.
//!
//! Lane ranges are relative to the block slice passed in and must be
//! multiples of `VN`; the grouped prefix always is because the group offset
//! is a multiple of `N`.

use planar_simd::{WideF32, WideI32, WideMask};
use planar_types::ContactPoint;

use crate::packed::{ContactJointPacked, LimiterPacked};
use crate::scratch::{BodyLanes, ParamLanes, SolveBody, SolveBodyParams};

/// Impulses smaller than this leave a body's activity marker untouched.
pub(crate) const PRODUCTIVE_IMPULSE: f32 = 1e-4;

/// Coulomb friction coefficient of the contact model.
pub(crate) const FRICTION_COEFFICIENT: f32 = 0.3;

#[inline]
fn load_indices<const VN: usize>(src: &[u32], at: usize) -> [u32; VN] {
    let mut out = [0u32; VN];
    out.copy_from_slice(&src[at..at + VN]);
    out
}

/// Gathered lanes of `VN` contact points.
struct ContactLanes<const VN: usize> {
    delta1_x: WideF32<VN>,
    delta1_y: WideF32<VN>,
    delta2_x: WideF32<VN>,
    delta2_y: WideF32<VN>,
    normal_x: WideF32<VN>,
    normal_y: WideF32<VN>,
}

impl<const VN: usize> ContactLanes<VN> {
    #[inline]
    fn gather(points: &[ContactPoint], indices: &[u32; VN]) -> Self {
        let mut delta1_x = [0.0; VN];
        let mut delta1_y = [0.0; VN];
        let mut delta2_x = [0.0; VN];
        let mut delta2_y = [0.0; VN];
        let mut normal_x = [0.0; VN];
        let mut normal_y = [0.0; VN];

        for lane in 0..VN {
            let point = &points[indices[lane] as usize];
            delta1_x[lane] = point.delta1.x;
            delta1_y[lane] = point.delta1.y;
            delta2_x[lane] = point.delta2.x;
            delta2_y[lane] = point.delta2.y;
            normal_x[lane] = point.normal.x;
            normal_y[lane] = point.normal.y;
        }

        Self {
            delta1_x: WideF32(delta1_x),
            delta1_y: WideF32(delta1_y),
            delta2_x: WideF32(delta2_x),
            delta2_y: WideF32(delta2_y),
            normal_x: WideF32(normal_x),
            normal_y: WideF32(normal_y),
        }
    }
}

/// One limiter's geometry for `VN` lanes.
struct LimiterLanes<const VN: usize> {
    normal_projector1_x: WideF32<VN>,
    normal_projector1_y: WideF32<VN>,
    normal_projector2_x: WideF32<VN>,
    normal_projector2_y: WideF32<VN>,
    angular_projector1: WideF32<VN>,
    angular_projector2: WideF32<VN>,
    comp_mass1_linear_x: WideF32<VN>,
    comp_mass1_linear_y: WideF32<VN>,
    comp_mass2_linear_x: WideF32<VN>,
    comp_mass2_linear_y: WideF32<VN>,
    comp_mass1_angular: WideF32<VN>,
    comp_mass2_angular: WideF32<VN>,
    comp_inv_mass: WideF32<VN>,
}

impl<const VN: usize> LimiterLanes<VN> {
    /// Build projectors and composite masses along direction `n1`/`n2` with
    /// lever arms `w1`/`w2`. A vanishing composite mass (two static bodies)
    /// yields a zero inverse, which silently disables the row.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    fn build(
        n1_x: WideF32<VN>,
        n1_y: WideF32<VN>,
        n2_x: WideF32<VN>,
        n2_y: WideF32<VN>,
        w1_x: WideF32<VN>,
        w1_y: WideF32<VN>,
        w2_x: WideF32<VN>,
        w2_y: WideF32<VN>,
        body1_inv_mass: WideF32<VN>,
        body1_inv_inertia: WideF32<VN>,
        body2_inv_mass: WideF32<VN>,
        body2_inv_inertia: WideF32<VN>,
    ) -> Self {
        let zero = WideF32::ZERO;
        let one = WideF32::splat(1.0);

        let angular_projector1 = n1_x * w1_y - n1_y * w1_x;
        let angular_projector2 = n2_x * w2_y - n2_y * w2_x;

        let comp_mass1_linear_x = n1_x * body1_inv_mass;
        let comp_mass1_linear_y = n1_y * body1_inv_mass;
        let comp_mass1_angular = angular_projector1 * body1_inv_inertia;
        let comp_mass2_linear_x = n2_x * body2_inv_mass;
        let comp_mass2_linear_y = n2_y * body2_inv_mass;
        let comp_mass2_angular = angular_projector2 * body2_inv_inertia;

        let comp_mass1 = n1_x * comp_mass1_linear_x
            + n1_y * comp_mass1_linear_y
            + angular_projector1 * comp_mass1_angular;
        let comp_mass2 = n2_x * comp_mass2_linear_x
            + n2_y * comp_mass2_linear_y
            + angular_projector2 * comp_mass2_angular;

        let comp_mass = comp_mass1 + comp_mass2;
        let comp_inv_mass = comp_mass.abs().simd_gt(zero).select(one / comp_mass, zero);

        Self {
            normal_projector1_x: n1_x,
            normal_projector1_y: n1_y,
            normal_projector2_x: n2_x,
            normal_projector2_y: n2_y,
            angular_projector1,
            angular_projector2,
            comp_mass1_linear_x,
            comp_mass1_linear_y,
            comp_mass2_linear_x,
            comp_mass2_linear_y,
            comp_mass1_angular,
            comp_mass2_angular,
            comp_inv_mass,
        }
    }

    #[inline]
    fn load<const N: usize>(src: &LimiterPacked<N>, lane: usize) -> Self {
        Self {
            normal_projector1_x: WideF32::load(&src.normal_projector1_x[lane..]),
            normal_projector1_y: WideF32::load(&src.normal_projector1_y[lane..]),
            normal_projector2_x: WideF32::load(&src.normal_projector2_x[lane..]),
            normal_projector2_y: WideF32::load(&src.normal_projector2_y[lane..]),
            angular_projector1: WideF32::load(&src.angular_projector1[lane..]),
            angular_projector2: WideF32::load(&src.angular_projector2[lane..]),
            comp_mass1_linear_x: WideF32::load(&src.comp_mass1_linear_x[lane..]),
            comp_mass1_linear_y: WideF32::load(&src.comp_mass1_linear_y[lane..]),
            comp_mass2_linear_x: WideF32::load(&src.comp_mass2_linear_x[lane..]),
            comp_mass2_linear_y: WideF32::load(&src.comp_mass2_linear_y[lane..]),
            comp_mass1_angular: WideF32::load(&src.comp_mass1_angular[lane..]),
            comp_mass2_angular: WideF32::load(&src.comp_mass2_angular[lane..]),
            comp_inv_mass: WideF32::load(&src.comp_inv_mass[lane..]),
        }
    }

    #[inline]
    fn store<const N: usize>(&self, dst: &mut LimiterPacked<N>, lane: usize) {
        self.normal_projector1_x
            .store(&mut dst.normal_projector1_x[lane..]);
        self.normal_projector1_y
            .store(&mut dst.normal_projector1_y[lane..]);
        self.normal_projector2_x
            .store(&mut dst.normal_projector2_x[lane..]);
        self.normal_projector2_y
            .store(&mut dst.normal_projector2_y[lane..]);
        self.angular_projector1
            .store(&mut dst.angular_projector1[lane..]);
        self.angular_projector2
            .store(&mut dst.angular_projector2[lane..]);
        self.comp_mass1_linear_x
            .store(&mut dst.comp_mass1_linear_x[lane..]);
        self.comp_mass1_linear_y
            .store(&mut dst.comp_mass1_linear_y[lane..]);
        self.comp_mass2_linear_x
            .store(&mut dst.comp_mass2_linear_x[lane..]);
        self.comp_mass2_linear_y
            .store(&mut dst.comp_mass2_linear_y[lane..]);
        self.comp_mass1_angular
            .store(&mut dst.comp_mass1_angular[lane..]);
        self.comp_mass2_angular
            .store(&mut dst.comp_mass2_angular[lane..]);
        self.comp_inv_mass.store(&mut dst.comp_inv_mass[lane..]);
    }

    /// Project body velocity lanes onto the constraint direction and
    /// subtract from `target`, yielding the velocity error.
    #[inline]
    fn velocity_error(
        &self,
        target: WideF32<VN>,
        body1: &BodyLanes<VN>,
        body2: &BodyLanes<VN>,
    ) -> WideF32<VN> {
        let mut error = target;
        error -= self.normal_projector1_x * body1.velocity_x;
        error -= self.normal_projector1_y * body1.velocity_y;
        error -= self.angular_projector1 * body1.angular_velocity;
        error -= self.normal_projector2_x * body2.velocity_x;
        error -= self.normal_projector2_y * body2.velocity_y;
        error -= self.angular_projector2 * body2.angular_velocity;
        error
    }

    /// Apply an impulse along the row to both bodies.
    #[inline]
    fn apply(&self, impulse: WideF32<VN>, body1: &mut BodyLanes<VN>, body2: &mut BodyLanes<VN>) {
        body1.velocity_x += self.comp_mass1_linear_x * impulse;
        body1.velocity_y += self.comp_mass1_linear_y * impulse;
        body1.angular_velocity += self.comp_mass1_angular * impulse;
        body2.velocity_x += self.comp_mass2_linear_x * impulse;
        body2.velocity_y += self.comp_mass2_linear_y * impulse;
        body2.angular_velocity += self.comp_mass2_angular * impulse;
    }
}

/// Recompute every joint's limiter geometry and velocity targets from the
/// current body poses.
///
/// Reads body scratch and contact points; writes only the joints' own lane
/// slots, which is what makes this pass an embarrassingly parallel map over
/// blocks. Accumulated normal and friction impulses are deliberately left
/// alone (they warm-start the next pre-step); the displacement impulse is
/// reset to zero.
pub(crate) fn refresh_joints<const VN: usize, const N: usize>(
    blocks: &mut [ContactJointPacked<N>],
    lane_begin: usize,
    lane_end: usize,
    contact_points: &[ContactPoint],
    bodies: &[SolveBody],
    params: &[SolveBodyParams],
) {
    debug_assert!(lane_begin % VN == 0 && lane_end % VN == 0);

    let zero = WideF32::<VN>::ZERO;
    let bounce = WideF32::<VN>::ZERO;
    let delta_velocity = WideF32::<VN>::splat(1.0);
    let max_penetration_velocity = WideF32::<VN>::splat(0.1);
    let delta_depth = WideF32::<VN>::splat(1.0);
    let error_reduction = WideF32::<VN>::splat(0.1);

    for lane_index in (lane_begin..lane_end).step_by(VN) {
        let block = &mut blocks[lane_index / N];
        let lane = if VN == N { 0 } else { lane_index % N };

        let indices1 = load_indices::<VN>(&block.body1_index, lane);
        let indices2 = load_indices::<VN>(&block.body2_index, lane);
        let point_indices = load_indices::<VN>(&block.contact_point_index, lane);

        let body1 = BodyLanes::gather(bodies, &indices1);
        let body2 = BodyLanes::gather(bodies, &indices2);
        let params1 = ParamLanes::gather(params, &indices1);
        let params2 = ParamLanes::gather(params, &indices2);
        let contact = ContactLanes::gather(contact_points, &point_indices);

        let point1_x = contact.delta1_x + params1.pos_x;
        let point1_y = contact.delta1_y + params1.pos_y;
        let point2_x = contact.delta2_x + params2.pos_x;
        let point2_y = contact.delta2_y + params2.pos_y;

        // Both limiters anchor to the contact as seen from body 1: w2 is
        // measured to point1, not point2. Stack stability depends on the
        // normal and friction rows sharing this anchor; do not symmetrise.
        let w1_x = contact.delta1_x;
        let w1_y = contact.delta1_y;
        let w2_x = point1_x - params2.pos_x;
        let w2_y = point1_y - params2.pos_y;

        let normal = LimiterLanes::build(
            contact.normal_x,
            contact.normal_y,
            -contact.normal_x,
            -contact.normal_y,
            w1_x,
            w1_y,
            w2_x,
            w2_y,
            params1.inv_mass,
            params1.inv_inertia,
            params2.inv_mass,
            params2.inv_inertia,
        );

        let point_velocity1_x =
            (params1.pos_y - point1_y) * body1.angular_velocity + body1.velocity_x;
        let point_velocity1_y =
            (point1_x - params1.pos_x) * body1.angular_velocity + body1.velocity_y;
        let point_velocity2_x =
            (params2.pos_y - point2_y) * body2.angular_velocity + body2.velocity_x;
        let point_velocity2_y =
            (point2_x - params2.pos_x) * body2.angular_velocity + body2.velocity_y;

        let relative_velocity_x = point_velocity1_x - point_velocity2_x;
        let relative_velocity_y = point_velocity1_y - point_velocity2_y;

        // Bounce is fixed at zero in this model, so dv vanishes; the term
        // is kept so the target arithmetic stays in one piece.
        let dv = -(bounce
            * (relative_velocity_x * contact.normal_x + relative_velocity_y * contact.normal_y));
        let depth = (point2_x - point1_x) * contact.normal_x
            + (point2_y - point1_y) * contact.normal_y;

        // Floating contacts get a slightly negative target (they may drift
        // apart); only penetration deeper than the slop pulls the target up.
        let dst_velocity = (dv - delta_velocity).max(zero);
        let dst_velocity = depth
            .simd_lt(delta_depth)
            .select(dst_velocity - max_penetration_velocity, dst_velocity);

        let dst_displacing_velocity =
            error_reduction * zero.max(depth - WideF32::splat(2.0) * delta_depth);

        let tangent_x = -contact.normal_y;
        let tangent_y = contact.normal_x;

        let friction = LimiterLanes::build(
            tangent_x,
            tangent_y,
            -tangent_x,
            -tangent_y,
            w1_x,
            w1_y,
            w2_x,
            w2_y,
            params1.inv_mass,
            params1.inv_inertia,
            params2.inv_mass,
            params2.inv_inertia,
        );

        normal.store(&mut block.normal_limiter.limiter, lane);
        dst_velocity.store(&mut block.normal_limiter.dst_velocity[lane..]);
        dst_displacing_velocity.store(&mut block.normal_limiter.dst_displacing_velocity[lane..]);
        zero.store(&mut block.normal_limiter.accumulated_displacing_impulse[lane..]);

        friction.store(&mut block.friction_limiter, lane);
    }
}

/// Warm start: replay each joint's carried-over normal and friction
/// impulses onto the body velocities. Displacement impulses start at zero
/// and are not replayed.
pub(crate) fn pre_step_joints<const VN: usize, const N: usize>(
    blocks: &[ContactJointPacked<N>],
    lane_begin: usize,
    lane_end: usize,
    bodies: &mut [SolveBody],
) {
    debug_assert!(lane_begin % VN == 0 && lane_end % VN == 0);

    for lane_index in (lane_begin..lane_end).step_by(VN) {
        let block = &blocks[lane_index / N];
        let lane = if VN == N { 0 } else { lane_index % N };

        let indices1 = load_indices::<VN>(&block.body1_index, lane);
        let indices2 = load_indices::<VN>(&block.body2_index, lane);

        let mut body1 = BodyLanes::gather(bodies, &indices1);
        let mut body2 = BodyLanes::gather(bodies, &indices2);

        let normal = LimiterLanes::<VN>::load(&block.normal_limiter.limiter, lane);
        let normal_impulse =
            WideF32::<VN>::load(&block.normal_limiter.limiter.accumulated_impulse[lane..]);

        let friction = LimiterLanes::<VN>::load(&block.friction_limiter, lane);
        let friction_impulse =
            WideF32::<VN>::load(&block.friction_limiter.accumulated_impulse[lane..]);

        normal.apply(normal_impulse, &mut body1, &mut body2);
        friction.apply(friction_impulse, &mut body1, &mut body2);

        body1.scatter(bodies, &indices1);
        body2.scatter(bodies, &indices2);
    }
}

/// One velocity iteration over a lane range.
///
/// Returns whether any lane applied a productive impulse; the caller stops
/// iterating once a whole sweep reports false.
pub(crate) fn solve_impulse_joints<const VN: usize, const N: usize>(
    blocks: &mut [ContactJointPacked<N>],
    lane_begin: usize,
    lane_end: usize,
    bodies: &mut [SolveBody],
    iteration: i32,
) -> bool {
    debug_assert!(lane_begin % VN == 0 && lane_end % VN == 0);

    let iteration_lanes = WideI32::<VN>::splat(iteration);
    let activity_gate = WideI32::<VN>::splat(iteration - 2);
    let productive_threshold = WideF32::<VN>::splat(PRODUCTIVE_IMPULSE);
    let friction_coefficient = WideF32::<VN>::splat(FRICTION_COEFFICIENT);

    let mut any_productive = WideMask::<VN>::NONE;

    for lane_index in (lane_begin..lane_end).step_by(VN) {
        let block = &mut blocks[lane_index / N];
        let lane = if VN == N { 0 } else { lane_index % N };

        let indices1 = load_indices::<VN>(&block.body1_index, lane);
        let indices2 = load_indices::<VN>(&block.body2_index, lane);

        let mut body1 = BodyLanes::gather(bodies, &indices1);
        let mut body2 = BodyLanes::gather(bodies, &indices2);

        // Quiescence gate: a body whose last productive impulse predates
        // the previous iteration cannot be re-excited by this sweep. The
        // one-iteration slack lets a freshly woken neighbour propagate.
        let active =
            body1.last_iteration.simd_gt(activity_gate) | body2.last_iteration.simd_gt(activity_gate);
        if !active.any() {
            continue;
        }

        let normal = LimiterLanes::<VN>::load(&block.normal_limiter.limiter, lane);
        let mut normal_impulse =
            WideF32::<VN>::load(&block.normal_limiter.limiter.accumulated_impulse[lane..]);
        let dst_velocity = WideF32::<VN>::load(&block.normal_limiter.dst_velocity[lane..]);

        let friction = LimiterLanes::<VN>::load(&block.friction_limiter, lane);
        let mut friction_impulse =
            WideF32::<VN>::load(&block.friction_limiter.accumulated_impulse[lane..]);

        // Non-penetration: clamp the total impulse to stay unilateral.
        let normal_error = normal.velocity_error(dst_velocity, &body1, &body2);
        let normal_delta = (normal_error * normal.comp_inv_mass).max(-normal_impulse);

        normal.apply(normal_delta, &mut body1, &mut body2);
        normal_impulse += normal_delta;

        // Friction: bilateral, clamped into the cone scaled by the normal
        // impulse accumulated so far this iteration.
        let friction_error = friction.velocity_error(WideF32::ZERO, &body1, &body2);
        let friction_delta = friction_error * friction.comp_inv_mass;

        let friction_force = friction_impulse + friction_delta;
        let cone_radius = normal_impulse * friction_coefficient;

        let clamped_delta = cone_radius.flip_sign(friction_force) - friction_impulse;
        let friction_delta = friction_force
            .abs()
            .simd_gt(cone_radius)
            .select(clamped_delta, friction_delta);

        friction_impulse += friction_delta;
        friction.apply(friction_delta, &mut body1, &mut body2);

        normal_impulse.store(&mut block.normal_limiter.limiter.accumulated_impulse[lane..]);
        friction_impulse.store(&mut block.friction_limiter.accumulated_impulse[lane..]);

        let cumulative = normal_delta.abs().max(friction_delta.abs());
        let productive = cumulative.simd_gt(productive_threshold);
        any_productive |= productive;

        body1.last_iteration = productive.select_i32(iteration_lanes, body1.last_iteration);
        body2.last_iteration = productive.select_i32(iteration_lanes, body2.last_iteration);

        body1.scatter(bodies, &indices1);
        body2.scatter(bodies, &indices2);
    }

    any_productive.any()
}

/// One displacement (position correction) iteration over a lane range.
///
/// Structurally the velocity iteration without friction, driven by the
/// displacement target and accumulator on the separate displacement
/// scratch.
pub(crate) fn solve_displacement_joints<const VN: usize, const N: usize>(
    blocks: &mut [ContactJointPacked<N>],
    lane_begin: usize,
    lane_end: usize,
    bodies: &mut [SolveBody],
    iteration: i32,
) -> bool {
    debug_assert!(lane_begin % VN == 0 && lane_end % VN == 0);

    let iteration_lanes = WideI32::<VN>::splat(iteration);
    let activity_gate = WideI32::<VN>::splat(iteration - 2);
    let productive_threshold = WideF32::<VN>::splat(PRODUCTIVE_IMPULSE);

    let mut any_productive = WideMask::<VN>::NONE;

    for lane_index in (lane_begin..lane_end).step_by(VN) {
        let block = &mut blocks[lane_index / N];
        let lane = if VN == N { 0 } else { lane_index % N };

        let indices1 = load_indices::<VN>(&block.body1_index, lane);
        let indices2 = load_indices::<VN>(&block.body2_index, lane);

        let mut body1 = BodyLanes::gather(bodies, &indices1);
        let mut body2 = BodyLanes::gather(bodies, &indices2);

        let active =
            body1.last_iteration.simd_gt(activity_gate) | body2.last_iteration.simd_gt(activity_gate);
        if !active.any() {
            continue;
        }

        let normal = LimiterLanes::<VN>::load(&block.normal_limiter.limiter, lane);
        let dst_displacing_velocity =
            WideF32::<VN>::load(&block.normal_limiter.dst_displacing_velocity[lane..]);
        let mut displacing_impulse =
            WideF32::<VN>::load(&block.normal_limiter.accumulated_displacing_impulse[lane..]);

        let error = normal.velocity_error(dst_displacing_velocity, &body1, &body2);
        let delta = (error * normal.comp_inv_mass).max(-displacing_impulse);

        normal.apply(delta, &mut body1, &mut body2);
        displacing_impulse += delta;

        displacing_impulse.store(&mut block.normal_limiter.accumulated_displacing_impulse[lane..]);

        let productive = delta.abs().simd_gt(productive_threshold);
        any_productive |= productive;

        body1.last_iteration = productive.select_i32(iteration_lanes, body1.last_iteration);
        body2.last_iteration = productive.select_i32(iteration_lanes, body2.last_iteration);

        body1.scatter(bodies, &indices1);
        body2.scatter(bodies, &indices2);
    }

    any_productive.any()
}
