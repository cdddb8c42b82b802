//! The solve entry point.
//!
//! [`Solver`] owns the persistent contact joints and every scratch buffer
//! the SoA pipeline needs, so steady-state frames allocate nothing. One
//! [`Solver::solve`] call runs the full pipeline: mirror bodies into
//! scratch, group, pack, refresh, warm start, iterate velocities, iterate
//! displacements, write everything back.

use rayon::prelude::*;

use planar_types::{ContactPoint, Result, RigidBody, SolveConfig, SolveMode};

use crate::grouping::JointGrouper;
use crate::joint::ContactJoint;
use crate::kernels;
use crate::packed::{self, ContactJointPacked};
use crate::scratch::{Scratch, SolveBody, SolveBodyParams};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Blocks below this count are refreshed serially; the parallel map only
/// pays off once there is real work to split.
const MIN_PARALLEL_REFRESH_BLOCKS: usize = 32;

/// Contacts refreshed per parallel task.
const REFRESH_CHUNK_LANES: usize = 64;

/// Diagnostics from one solve call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveStats {
    /// Mean per-contact iteration count, velocity and displacement passes
    /// combined. Rises toward the configured iteration caps when the scene
    /// fails to converge.
    pub mean_iterations: f32,
    /// Number of contact joints solved.
    pub joint_count: usize,
    /// Length of the batch-solvable permutation prefix; the remainder ran
    /// as scalar tail.
    pub group_offset: usize,
}

/// Iterative contact solver over 2D rigid bodies.
///
/// The solver owns its joints: collision detection adds a joint per new
/// contact and removes joints whose contacts expired, while accumulated
/// impulses ride along inside the joints to warm-start the next frame.
///
/// # Example
///
/// ```
/// use planar_solver::{ContactJoint, Solver};
/// use planar_types::{BodyId, ContactPoint, Coords, RigidBody, SolveConfig, SolveMode, Vector2};
///
/// let mut bodies = vec![
///     RigidBody::fixed(Coords::identity()),
///     RigidBody::new(Coords::from_angle(Vector2::new(0.0, 4.0), 0.0), 1.0, 1.0),
/// ];
/// bodies[1].velocity.y = -10.0;
///
/// let points = vec![ContactPoint::new(
///     Vector2::new(0.0, -4.0),
///     Vector2::new(0.0, 0.1),
///     Vector2::new(0.0, 1.0),
/// )];
///
/// let mut solver = Solver::new();
/// solver.add_joint(ContactJoint::new(BodyId::new(1), BodyId::new(0), 0));
///
/// let config = SolveConfig::default().with_mode(SolveMode::Scalar);
/// let stats = solver.solve(&mut bodies, &points, &config).unwrap();
///
/// assert_eq!(stats.joint_count, 1);
/// assert!(bodies[1].velocity.y.abs() < 0.15);
/// ```
#[derive(Debug, Default)]
pub struct Solver {
    contact_joints: Vec<ContactJoint>,

    grouper: JointGrouper,

    // Scratch retained across calls; grown, never shrunk.
    joint_index: Scratch<u32>,
    joint_packed1: Scratch<ContactJointPacked<1>>,
    joint_packed4: Scratch<ContactJointPacked<4>>,
    joint_packed8: Scratch<ContactJointPacked<8>>,
    solve_bodies_params: Scratch<SolveBodyParams>,
    solve_bodies_impulse: Scratch<SolveBody>,
    solve_bodies_displacement: Scratch<SolveBody>,
}

impl Solver {
    /// Create an empty solver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact joint.
    pub fn add_joint(&mut self, joint: ContactJoint) {
        self.contact_joints.push(joint);
    }

    /// The current joints.
    #[must_use]
    pub fn joints(&self) -> &[ContactJoint] {
        &self.contact_joints
    }

    /// Mutable access to the current joints, for impulse carry-over edits.
    pub fn joints_mut(&mut self) -> &mut [ContactJoint] {
        &mut self.contact_joints
    }

    /// Keep only the joints whose contacts are still alive.
    pub fn retain_joints<F>(&mut self, keep: F)
    where
        F: FnMut(&ContactJoint) -> bool,
    {
        self.contact_joints.retain(keep);
    }

    /// Remove every joint.
    pub fn clear_joints(&mut self) {
        self.contact_joints.clear();
    }

    /// Resolve all contacts.
    ///
    /// Mutates body velocities and displacing velocities and the joints'
    /// accumulated impulses. Bodies must be index-stable for the call:
    /// joints address them by position in `bodies`.
    ///
    /// # Errors
    ///
    /// Returns [`planar_types::SolverError::UnsupportedMode`] when the
    /// configured mode is not available on this host, and
    /// [`planar_types::SolverError::InvalidConfig`] when the configuration
    /// fails validation. The checks run before any state is touched.
    pub fn solve(
        &mut self,
        bodies: &mut [RigidBody],
        contact_points: &[ContactPoint],
        config: &SolveConfig,
    ) -> Result<SolveStats> {
        config.validate()?;

        tracing::debug!(
            joints = self.contact_joints.len(),
            bodies = bodies.len(),
            mode = %config.mode,
            "solving contact joints"
        );

        if self.contact_joints.is_empty() {
            return Ok(SolveStats::default());
        }

        let Self {
            contact_joints,
            grouper,
            joint_index,
            joint_packed1,
            joint_packed4,
            joint_packed8,
            solve_bodies_params,
            solve_bodies_impulse,
            solve_bodies_displacement,
        } = self;

        let stats = match config.mode {
            SolveMode::Scalar => solve_width::<1>(
                contact_joints,
                grouper,
                joint_index,
                joint_packed1,
                solve_bodies_params,
                solve_bodies_impulse,
                solve_bodies_displacement,
                bodies,
                contact_points,
                config,
            ),
            SolveMode::Sse2 => solve_width::<4>(
                contact_joints,
                grouper,
                joint_index,
                joint_packed4,
                solve_bodies_params,
                solve_bodies_impulse,
                solve_bodies_displacement,
                bodies,
                contact_points,
                config,
            ),
            SolveMode::Avx2 => solve_width::<8>(
                contact_joints,
                grouper,
                joint_index,
                joint_packed8,
                solve_bodies_params,
                solve_bodies_impulse,
                solve_bodies_displacement,
                bodies,
                contact_points,
                config,
            ),
        };

        Ok(stats)
    }
}

/// Run the pipeline at block width `N`.
#[allow(
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn solve_width<const N: usize>(
    joints: &mut [ContactJoint],
    grouper: &mut JointGrouper,
    joint_index: &mut Scratch<u32>,
    joint_packed: &mut Scratch<ContactJointPacked<N>>,
    solve_bodies_params: &mut Scratch<SolveBodyParams>,
    solve_bodies_impulse: &mut Scratch<SolveBody>,
    solve_bodies_displacement: &mut Scratch<SolveBody>,
    bodies: &mut [RigidBody],
    contact_points: &[ContactPoint],
    config: &SolveConfig,
) -> SolveStats {
    let joint_count = joints.len();
    let body_count = bodies.len();

    // Mirror bodies into the per-pass scratch. Activity markers start at
    // -1 so every contact is live in iteration zero.
    solve_bodies_params.reset(body_count);
    solve_bodies_impulse.reset(body_count);
    solve_bodies_displacement.reset(body_count);

    for (index, body) in bodies.iter().enumerate() {
        solve_bodies_params[index] = SolveBodyParams::from_body(body);

        solve_bodies_impulse[index] = SolveBody {
            velocity_x: body.velocity.x,
            velocity_y: body.velocity.y,
            angular_velocity: body.angular_velocity,
            last_iteration: -1,
        };

        solve_bodies_displacement[index] = SolveBody {
            velocity_x: body.displacing_velocity.x,
            velocity_y: body.displacing_velocity.y,
            angular_velocity: body.displacing_angular_velocity,
            last_iteration: -1,
        };
    }

    joint_index.reset(joint_count);
    let group_offset = grouper.group(joints, body_count, N, joint_index);

    tracing::trace!(joint_count, group_offset, width = N, "grouped contact joints");

    joint_packed.reset(joint_count.div_ceil(N));
    for (lane_index, &source) in joint_index.iter().enumerate() {
        packed::pack_joint(joint_packed, lane_index, &joints[source as usize]);
    }

    let params: &[SolveBodyParams] = solve_bodies_params;
    let impulse: &mut [SolveBody] = solve_bodies_impulse;
    let displacement: &mut [SolveBody] = solve_bodies_displacement;

    let prefix_blocks = group_offset / N;
    let tail_lanes = joint_count - group_offset;
    let (prefix, tail) = joint_packed.split_at_mut(prefix_blocks);

    refresh_parallel(prefix, contact_points, impulse, params);
    kernels::refresh_joints::<1, N>(tail, 0, tail_lanes, contact_points, impulse, params);

    kernels::pre_step_joints::<N, N>(prefix, 0, group_offset, impulse);
    kernels::pre_step_joints::<1, N>(tail, 0, tail_lanes, impulse);

    for iteration in 0..config.velocity_iterations {
        let iteration = iteration as i32;

        let mut productive = false;
        productive |= kernels::solve_impulse_joints::<N, N>(prefix, 0, group_offset, impulse, iteration);
        productive |= kernels::solve_impulse_joints::<1, N>(tail, 0, tail_lanes, impulse, iteration);

        if !productive {
            break;
        }
    }

    for iteration in 0..config.position_iterations {
        let iteration = iteration as i32;

        let mut productive = false;
        productive |=
            kernels::solve_displacement_joints::<N, N>(prefix, 0, group_offset, displacement, iteration);
        productive |=
            kernels::solve_displacement_joints::<1, N>(tail, 0, tail_lanes, displacement, iteration);

        if !productive {
            break;
        }
    }

    for (index, body) in bodies.iter_mut().enumerate() {
        body.velocity.x = impulse[index].velocity_x;
        body.velocity.y = impulse[index].velocity_y;
        body.angular_velocity = impulse[index].angular_velocity;

        body.displacing_velocity.x = displacement[index].velocity_x;
        body.displacing_velocity.y = displacement[index].velocity_y;
        body.displacing_angular_velocity = displacement[index].angular_velocity;
    }

    let joint_packed: &[ContactJointPacked<N>] = joint_packed;
    for (lane_index, &source) in joint_index.iter().enumerate() {
        packed::unpack_impulses(joint_packed, lane_index, &mut joints[source as usize]);
    }

    // Diagnostic only. "+2" folds the -1 idle marker into a non-negative
    // per-pass count; the exact arithmetic is part of the interface.
    let mut iteration_sum = 0i64;
    for lane_index in 0..joint_count {
        let block = &joint_packed[lane_index / N];
        let lane = lane_index % N;

        let body1 = block.body1_index[lane] as usize;
        let body2 = block.body2_index[lane] as usize;

        iteration_sum += i64::from(
            impulse[body1]
                .last_iteration
                .max(impulse[body2].last_iteration)
                + 2,
        );
        iteration_sum += i64::from(
            displacement[body1]
                .last_iteration
                .max(displacement[body2].last_iteration)
                + 2,
        );
    }

    SolveStats {
        mean_iterations: iteration_sum as f32 / joint_count as f32,
        joint_count,
        group_offset,
    }
}

/// Refresh the grouped prefix as a parallel map over whole blocks.
///
/// Safe to parallelise because refresh reads only body scratch and contact
/// points and writes only the chunk's own lane slots.
fn refresh_parallel<const N: usize>(
    prefix: &mut [ContactJointPacked<N>],
    contact_points: &[ContactPoint],
    bodies: &[SolveBody],
    params: &[SolveBodyParams],
) {
    if prefix.len() < MIN_PARALLEL_REFRESH_BLOCKS {
        kernels::refresh_joints::<N, N>(prefix, 0, prefix.len() * N, contact_points, bodies, params);
        return;
    }

    let chunk_blocks = (REFRESH_CHUNK_LANES / N).max(1);
    prefix.par_chunks_mut(chunk_blocks).for_each(|chunk| {
        kernels::refresh_joints::<N, N>(chunk, 0, chunk.len() * N, contact_points, bodies, params);
    });
}
