//! Width-parameterised SIMD lane types for physics hot paths.
//!
//! This crate provides the lane-group abstraction the contact solver is
//! written against: [`WideF32`], [`WideI32`], and [`WideMask`], each generic
//! over a lane count `N` (1, 4, or 8 in practice).
//!
//! # Approach
//!
//! Lanes are plain `[T; N]` arrays and every operation is a fixed-count
//! per-lane loop. With `N` known at monomorphisation time the
//! autovectoriser reliably turns these loops into SSE2 (`N = 4`) and AVX2
//! (`N = 8`) instructions, while `N = 1` compiles to ordinary scalar code.
//! This keeps the crate free of `unsafe` and of per-architecture intrinsic
//! paths, and it guarantees that the scalar and wide paths compute the same
//! arithmetic, which the solver's batch/tail split depends on.
//!
//! # Example
//!
//! ```
//! use planar_simd::WideF32;
//!
//! let a = WideF32::<4>::new([1.0, -2.0, 3.0, -4.0]);
//! let limit = WideF32::<4>::splat(2.5);
//!
//! let over = a.abs().simd_gt(limit);
//! let clamped = over.select(limit.flip_sign(a), a);
//!
//! assert_eq!(clamped.to_array(), [1.0, -2.0, 2.5, -2.5]);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Fixed-count index loops are the vectorisation idiom here.
#![allow(clippy::missing_const_for_fn, clippy::needless_range_loop)]

mod wide;

pub use wide::{WideF32, WideI32, WideMask};

#[cfg(test)]
mod tests;
