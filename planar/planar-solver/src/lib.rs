//! SIMD-batched projected Gauss-Seidel contact solver for 2D rigid bodies.
//!
//! This crate resolves inter-penetration and Coulomb friction at many
//! simultaneous contact points. Three intertwined pieces do the heavy
//! lifting:
//!
//! - **Projected Gauss-Seidel iteration**: each contact carries a normal
//!   and a friction constraint row ([`ContactJoint`]); iterations sweep the
//!   rows one batch at a time, clamping accumulated impulses into their
//!   feasible intervals and warm-starting from the previous frame.
//! - **AoS → SoA batching**: joints are repacked into
//!   [`ContactJointPacked`] lane blocks of width 1, 4, or 8 so one sweep
//!   step solves a whole batch.
//! - **Independent-set grouping** ([`JointGrouper`]): a permutation whose
//!   prefix decomposes into body-disjoint groups, guaranteeing the lanes of
//!   a batch never gather or scatter the same body.
//!
//! The solve pipeline per call: mirror bodies into scratch, group, pack,
//! refresh contact geometry, warm start, velocity iterations, displacement
//! iterations, unpack. See [`Solver::solve`].
//!
//! Out of scope by design: collision detection (contacts come in as
//! [`ContactPoint`](planar_types::ContactPoint)s), free-body integration,
//! island partitioning (each solve call is one island), restitution (the
//! model fixes bounce at zero), and joints other than contacts.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Fixed-count index loops in the gathers are the vectorisation idiom here.
#![allow(clippy::missing_const_for_fn, clippy::needless_range_loop)]

mod grouping;
mod joint;
mod kernels;
mod packed;
mod scratch;
mod solver;

pub use grouping::JointGrouper;
pub use joint::{ContactJoint, Limiter, NormalLimiter};
pub use packed::{pack_joint, unpack_impulses, ContactJointPacked, LimiterPacked, NormalLimiterPacked};
pub use scratch::{BodyLanes, ParamLanes, Scratch, SolveBody, SolveBodyParams};
pub use solver::{SolveStats, Solver};

// Re-export the input types so downstream users need only this crate.
pub use planar_types::{
    BodyId, ContactPoint, Coords, Result, RigidBody, SolveConfig, SolveMode, SolverError,
};
