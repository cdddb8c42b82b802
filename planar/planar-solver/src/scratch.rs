//! Per-body solver scratch and its gathered lane views.
//!
//! During a solve the mutable body state lives in two compact mirrors, one
//! for the velocity pass and one for the displacement pass, plus one
//! read-only record of mass properties and pose. The records are sized and
//! aligned so that one body is one aligned gather: 16 bytes of mutable
//! state, 32 bytes of parameters.

use std::ops::{Deref, DerefMut};

use planar_simd::{WideF32, WideI32};
use planar_types::RigidBody;

/// Mutable per-body state for one solver pass.
///
/// Exactly 16 bytes. The fourth lane is the index of the last iteration in
/// which this body received a productive impulse; it rides through the same
/// gather as the three velocity lanes and is compared, never arithmetically
/// combined.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(16))]
pub struct SolveBody {
    /// Linear velocity X.
    pub velocity_x: f32,
    /// Linear velocity Y.
    pub velocity_y: f32,
    /// Angular velocity.
    pub angular_velocity: f32,
    /// Iteration index of the last productive impulse, or -1.
    pub last_iteration: i32,
}

impl Default for SolveBody {
    fn default() -> Self {
        Self {
            velocity_x: 0.0,
            velocity_y: 0.0,
            angular_velocity: 0.0,
            last_iteration: -1,
        }
    }
}

/// Read-only per-body parameters: one 32-byte line per body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(32))]
pub struct SolveBodyParams {
    /// Inverse mass.
    pub inv_mass: f32,
    /// Inverse inertia.
    pub inv_inertia: f32,
    /// Pose origin X.
    pub pos_x: f32,
    /// Pose origin Y.
    pub pos_y: f32,
    /// Local X axis, world X component.
    pub x_vec_x: f32,
    /// Local X axis, world Y component.
    pub x_vec_y: f32,
    /// Local Y axis, world X component.
    pub y_vec_x: f32,
    /// Local Y axis, world Y component.
    pub y_vec_y: f32,
}

impl SolveBodyParams {
    /// Capture a body's parameters.
    #[must_use]
    pub fn from_body(body: &RigidBody) -> Self {
        Self {
            inv_mass: body.inv_mass,
            inv_inertia: body.inv_inertia,
            pos_x: body.coords.pos.x,
            pos_y: body.coords.pos.y,
            x_vec_x: body.coords.x_vector.x,
            x_vec_y: body.coords.x_vector.y,
            y_vec_x: body.coords.y_vector.x,
            y_vec_y: body.coords.y_vector.y,
        }
    }
}

/// A grow-only scratch buffer retained across solve calls.
///
/// Resizing never shrinks the allocation, so steady-state frames allocate
/// nothing. Alignment of the contents is carried by the element type's
/// `repr(align)`.
#[derive(Debug, Default)]
pub struct Scratch<T> {
    buf: Vec<T>,
    len: usize,
}

impl<T: Copy + Default> Scratch<T> {
    /// Set the live length, growing the allocation if needed. Newly exposed
    /// elements hold stale or default values; callers overwrite what they
    /// read.
    pub fn reset(&mut self, len: usize) {
        if self.buf.len() < len {
            self.buf.resize(len, T::default());
        }
        self.len = len;
    }
}

impl<T> Deref for Scratch<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.buf[..self.len]
    }
}

impl<T> DerefMut for Scratch<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buf[..self.len]
    }
}

/// Gathered lanes of `VN` bodies' mutable state.
#[derive(Debug, Clone, Copy)]
pub struct BodyLanes<const VN: usize> {
    /// Linear velocity X lanes.
    pub velocity_x: WideF32<VN>,
    /// Linear velocity Y lanes.
    pub velocity_y: WideF32<VN>,
    /// Angular velocity lanes.
    pub angular_velocity: WideF32<VN>,
    /// Last-productive-iteration lanes.
    pub last_iteration: WideI32<VN>,
}

impl<const VN: usize> BodyLanes<VN> {
    /// Gather `VN` bodies by index.
    #[inline]
    #[must_use]
    pub fn gather(bodies: &[SolveBody], indices: &[u32; VN]) -> Self {
        let mut velocity_x = [0.0; VN];
        let mut velocity_y = [0.0; VN];
        let mut angular_velocity = [0.0; VN];
        let mut last_iteration = [0; VN];

        for lane in 0..VN {
            let body = &bodies[indices[lane] as usize];
            velocity_x[lane] = body.velocity_x;
            velocity_y[lane] = body.velocity_y;
            angular_velocity[lane] = body.angular_velocity;
            last_iteration[lane] = body.last_iteration;
        }

        Self {
            velocity_x: WideF32(velocity_x),
            velocity_y: WideF32(velocity_y),
            angular_velocity: WideF32(angular_velocity),
            last_iteration: WideI32(last_iteration),
        }
    }

    /// Scatter the lanes back by index.
    ///
    /// Within one SIMD group the indices are pairwise distinct by the
    /// grouping invariant, so lane order is immaterial.
    #[inline]
    pub fn scatter(&self, bodies: &mut [SolveBody], indices: &[u32; VN]) {
        for lane in 0..VN {
            let body = &mut bodies[indices[lane] as usize];
            body.velocity_x = self.velocity_x.0[lane];
            body.velocity_y = self.velocity_y.0[lane];
            body.angular_velocity = self.angular_velocity.0[lane];
            body.last_iteration = self.last_iteration.0[lane];
        }
    }
}

/// Gathered lanes of `VN` bodies' read-only parameters.
#[derive(Debug, Clone, Copy)]
pub struct ParamLanes<const VN: usize> {
    /// Inverse mass lanes.
    pub inv_mass: WideF32<VN>,
    /// Inverse inertia lanes.
    pub inv_inertia: WideF32<VN>,
    /// Pose origin X lanes.
    pub pos_x: WideF32<VN>,
    /// Pose origin Y lanes.
    pub pos_y: WideF32<VN>,
}

impl<const VN: usize> ParamLanes<VN> {
    /// Gather `VN` bodies' parameters by index.
    #[inline]
    #[must_use]
    pub fn gather(params: &[SolveBodyParams], indices: &[u32; VN]) -> Self {
        let mut inv_mass = [0.0; VN];
        let mut inv_inertia = [0.0; VN];
        let mut pos_x = [0.0; VN];
        let mut pos_y = [0.0; VN];

        for lane in 0..VN {
            let body = &params[indices[lane] as usize];
            inv_mass[lane] = body.inv_mass;
            inv_inertia[lane] = body.inv_inertia;
            pos_x[lane] = body.pos_x;
            pos_y[lane] = body.pos_y;
        }

        Self {
            inv_mass: WideF32(inv_mass),
            inv_inertia: WideF32(inv_inertia),
            pos_x: WideF32(pos_x),
            pos_y: WideF32(pos_y),
        }
    }
}
