//! Core types for the planar contact solver.
//!
//! This crate provides the foundational types shared by the solver stack:
//!
//! - [`RigidBody`] - Pose, velocity, and mass properties of a 2D rigid body
//! - [`ContactPoint`] - One point of contact between two bodies
//! - [`SolveConfig`] - Execution mode and iteration counts
//! - [`SolverError`] - Error taxonomy for the solver
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no physics, no iteration, no
//! SIMD. They're the common language between:
//!
//! - Collision detection (producing contact points)
//! - The contact solver (consuming bodies + contacts, producing impulses)
//! - Integration (advancing body poses from solved velocities)
//!
//! # Coordinate System
//!
//! 2D, right-handed: X right, Y up. A body pose stores its origin plus
//! explicit world-space basis vectors rather than an angle, so the solver
//! never evaluates trigonometric functions in a hot path.
//!
//! # Example
//!
//! ```
//! use planar_types::{Coords, RigidBody};
//! use nalgebra::Vector2;
//!
//! let ground = RigidBody::fixed(Coords::from_angle(Vector2::new(0.0, 0.0), 0.0));
//! let block = RigidBody::dynamic_box(
//!     Coords::from_angle(Vector2::new(0.0, 4.0), 0.0),
//!     Vector2::new(2.0, 2.0),
//! );
//!
//! assert!(ground.is_static());
//! assert!(block.inv_mass > 0.0);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod body;
mod config;
mod contact;
mod error;

pub use body::{BodyId, Coords, RigidBody};
pub use config::{SolveConfig, SolveMode};
pub use contact::ContactPoint;
pub use error::SolverError;

// Re-export the math type used throughout the public API.
pub use nalgebra::Vector2;

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_static_body_has_no_mass() {
        let body = RigidBody::fixed(Coords::identity());
        assert_eq!(body.inv_mass, 0.0);
        assert_eq!(body.inv_inertia, 0.0);
        assert!(body.is_static());
    }

    #[test]
    fn test_dynamic_box_mass_properties() {
        let body = RigidBody::dynamic_box(Coords::identity(), Vector2::new(2.0, 2.0));

        // 4x4 box of unit density: mass 16, inertia 16 * (4 + 4) / 12
        assert!((1.0 / body.inv_mass - 16.0).abs() < 1e-4);
        assert!(!body.is_static());
        assert!(body.is_finite());
    }
}
