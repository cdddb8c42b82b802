//! Tests for the lane-group operations.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use approx::assert_relative_eq;

use crate::{WideF32, WideI32, WideMask};

#[test]
fn test_splat_and_arithmetic() {
    let a = WideF32::<4>::splat(2.0);
    let b = WideF32::<4>::new([1.0, 2.0, 3.0, 4.0]);

    assert_eq!((a + b).to_array(), [3.0, 4.0, 5.0, 6.0]);
    assert_eq!((a - b).to_array(), [1.0, 0.0, -1.0, -2.0]);
    assert_eq!((a * b).to_array(), [2.0, 4.0, 6.0, 8.0]);
    assert_eq!((b / a).to_array(), [0.5, 1.0, 1.5, 2.0]);
    assert_eq!((-b).to_array(), [-1.0, -2.0, -3.0, -4.0]);
}

#[test]
fn test_load_store_roundtrip() {
    let src = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let lanes = WideF32::<8>::load(&src);

    let mut dst = [0.0; 8];
    lanes.store(&mut dst);
    assert_eq!(dst, src);
}

#[test]
fn test_width_one_behaves_like_scalar() {
    let a = WideF32::<1>::splat(3.0);
    let b = WideF32::<1>::splat(-4.0);

    assert_eq!((a * b).to_array(), [-12.0]);
    assert_eq!(a.max(b).to_array(), [3.0]);
    assert!(a.simd_gt(b).all());
}

#[test]
fn test_abs_max_min() {
    let a = WideF32::<4>::new([-1.0, 2.0, -3.0, 0.0]);
    let b = WideF32::<4>::new([0.5, -0.5, -4.0, 0.0]);

    assert_eq!(a.abs().to_array(), [1.0, 2.0, 3.0, 0.0]);
    assert_eq!(a.max(b).to_array(), [0.5, 2.0, -3.0, 0.0]);
    assert_eq!(a.min(b).to_array(), [-1.0, -0.5, -4.0, 0.0]);
}

#[test]
fn test_comparisons_and_select() {
    let a = WideF32::<4>::new([1.0, 5.0, 3.0, 0.0]);
    let b = WideF32::<4>::new([2.0, 4.0, 3.0, -1.0]);

    let gt = a.simd_gt(b);
    assert_eq!(gt.0, [false, true, false, true]);
    assert!(gt.any());
    assert!(!gt.all());

    let blended = gt.select(WideF32::splat(1.0), WideF32::splat(-1.0));
    assert_eq!(blended.to_array(), [-1.0, 1.0, 1.0, -1.0]);
}

#[test]
fn test_select_i32() {
    let mask = WideMask::<4>([true, false, true, false]);
    let picked = mask.select_i32(WideI32::splat(7), WideI32::new([0, 1, 2, 3]));
    assert_eq!(picked.to_array(), [7, 1, 7, 3]);
}

#[test]
fn test_flip_sign_transfers_sign_bit() {
    let magnitude = WideF32::<4>::new([1.5, 2.5, -3.5, -4.5]);
    let sign = WideF32::<4>::new([-1.0, 1.0, -1.0, 1.0]);

    // Pure XOR of sign bits: a negative lane under a negative sign flips
    // back to positive.
    let flipped = magnitude.flip_sign(sign);
    assert_eq!(flipped.to_array(), [-1.5, 2.5, 3.5, -4.5]);
}

#[test]
fn test_flip_sign_preserves_zero_sign() {
    let zero = WideF32::<1>::splat(0.0);
    let negative = WideF32::<1>::splat(-2.0);

    let flipped = zero.flip_sign(negative);
    assert_eq!(flipped.to_array()[0].to_bits(), (-0.0_f32).to_bits());
}

#[test]
fn test_bitcast_roundtrip() {
    let markers = WideI32::<4>::new([-1, 0, 7, i32::MAX]);
    let as_floats = WideF32::from_bits(markers);
    let back = as_floats.to_bits();

    assert_eq!(back.to_array(), markers.to_array());
}

#[test]
fn test_i32_compare() {
    let last = WideI32::<4>::new([-1, 3, 5, 2]);
    let gate = WideI32::<4>::splat(2);

    let active = last.simd_gt(gate);
    assert_eq!(active.0, [false, true, true, false]);
}

#[test]
fn test_mask_or() {
    let mut acc = WideMask::<4>::NONE;
    assert!(!acc.any());

    acc |= WideMask([false, true, false, false]);
    acc |= WideMask([true, false, false, false]);
    assert_eq!(acc.0, [true, true, false, false]);
}

#[test]
fn test_division_matches_scalar() {
    let numerator = WideF32::<8>::splat(1.0);
    let denominator = WideF32::<8>::new([1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0]);

    let quotient = numerator / denominator;
    for lane in 0..8 {
        assert_relative_eq!(
            quotient.to_array()[lane],
            1.0 / denominator.to_array()[lane],
            epsilon = 1e-10
        );
    }
}
