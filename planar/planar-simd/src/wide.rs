//! Lane-group types and per-lane operations.

use std::ops::{Add, AddAssign, BitOr, BitOrAssign, Div, Mul, Neg, Sub, SubAssign};

/// A lane group of `N` single-precision floats.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct WideF32<const N: usize>(pub [f32; N]);

/// A lane group of `N` 32-bit integers.
///
/// Used for body indices and per-body iteration markers that travel through
/// the same gathers as the float lanes. No float arithmetic is ever
/// performed on these lanes; [`WideF32::from_bits`] and [`WideF32::to_bits`]
/// exist for hosts that fold an integer lane into a float gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct WideI32<const N: usize>(pub [i32; N]);

/// A lane group of `N` booleans, produced by comparisons and consumed by
/// [`WideMask::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct WideMask<const N: usize>(pub [bool; N]);

impl<const N: usize> WideF32<N> {
    /// All lanes zero.
    pub const ZERO: Self = Self([0.0; N]);

    /// Construct from a lane array.
    #[inline]
    #[must_use]
    pub const fn new(lanes: [f32; N]) -> Self {
        Self(lanes)
    }

    /// Broadcast one value to every lane.
    #[inline]
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self([value; N])
    }

    /// Load the first `N` values of a slice.
    ///
    /// # Panics
    ///
    /// Panics if the slice holds fewer than `N` values.
    #[inline]
    #[must_use]
    pub fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0; N];
        lanes.copy_from_slice(&src[..N]);
        Self(lanes)
    }

    /// Store the lanes into the first `N` values of a slice.
    ///
    /// # Panics
    ///
    /// Panics if the slice holds fewer than `N` values.
    #[inline]
    pub fn store(self, dst: &mut [f32]) {
        dst[..N].copy_from_slice(&self.0);
    }

    /// Get the lane array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; N] {
        self.0
    }

    /// Per-lane absolute value.
    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane].abs();
        }
        Self(out)
    }

    /// Per-lane maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane].max(other.0[lane]);
        }
        Self(out)
    }

    /// Per-lane minimum.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane].min(other.0[lane]);
        }
        Self(out)
    }

    /// Per-lane `self > other`.
    #[inline]
    #[must_use]
    pub fn simd_gt(self, other: Self) -> WideMask<N> {
        let mut out = [false; N];
        for lane in 0..N {
            out[lane] = self.0[lane] > other.0[lane];
        }
        WideMask(out)
    }

    /// Per-lane `self < other`.
    #[inline]
    #[must_use]
    pub fn simd_lt(self, other: Self) -> WideMask<N> {
        let mut out = [false; N];
        for lane in 0..N {
            out[lane] = self.0[lane] < other.0[lane];
        }
        WideMask(out)
    }

    /// Transfer the sign bit of `sign` onto each lane of `self`.
    ///
    /// This is a pure bit operation (`self ^ (sign & -0.0)`), matching the
    /// SIMD `flipsign` idiom: it never rounds, and a negative `self` lane
    /// under a negative `sign` lane comes out positive.
    #[inline]
    #[must_use]
    pub fn flip_sign(self, sign: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] =
                f32::from_bits(self.0[lane].to_bits() ^ (sign.0[lane].to_bits() & 0x8000_0000));
        }
        Self(out)
    }

    /// Reinterpret the lane bits as integers.
    #[inline]
    #[must_use]
    pub fn to_bits(self) -> WideI32<N> {
        let mut out = [0; N];
        for lane in 0..N {
            out[lane] = self.0[lane].to_bits() as i32;
        }
        WideI32(out)
    }

    /// Reinterpret integer lane bits as floats.
    #[inline]
    #[must_use]
    pub fn from_bits(bits: WideI32<N>) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = f32::from_bits(bits.0[lane] as u32);
        }
        Self(out)
    }
}

impl<const N: usize> Default for WideF32<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> Add for WideF32<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane] + rhs.0[lane];
        }
        Self(out)
    }
}

impl<const N: usize> Sub for WideF32<N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane] - rhs.0[lane];
        }
        Self(out)
    }
}

impl<const N: usize> Mul for WideF32<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane] * rhs.0[lane];
        }
        Self(out)
    }
}

impl<const N: usize> Div for WideF32<N> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = self.0[lane] / rhs.0[lane];
        }
        Self(out)
    }
}

impl<const N: usize> Neg for WideF32<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = -self.0[lane];
        }
        Self(out)
    }
}

impl<const N: usize> AddAssign for WideF32<N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> SubAssign for WideF32<N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const N: usize> WideI32<N> {
    /// Construct from a lane array.
    #[inline]
    #[must_use]
    pub const fn new(lanes: [i32; N]) -> Self {
        Self(lanes)
    }

    /// Broadcast one value to every lane.
    #[inline]
    #[must_use]
    pub const fn splat(value: i32) -> Self {
        Self([value; N])
    }

    /// Get the lane array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [i32; N] {
        self.0
    }

    /// Per-lane `self > other`.
    #[inline]
    #[must_use]
    pub fn simd_gt(self, other: Self) -> WideMask<N> {
        let mut out = [false; N];
        for lane in 0..N {
            out[lane] = self.0[lane] > other.0[lane];
        }
        WideMask(out)
    }
}

impl<const N: usize> Default for WideI32<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> WideMask<N> {
    /// All lanes false.
    pub const NONE: Self = Self([false; N]);

    /// Whether any lane is set.
    #[inline]
    #[must_use]
    pub fn any(self) -> bool {
        self.0.iter().any(|&lane| lane)
    }

    /// Whether every lane is set.
    #[inline]
    #[must_use]
    pub fn all(self) -> bool {
        self.0.iter().all(|&lane| lane)
    }

    /// Per-lane blend: `if_true` where the mask is set, `if_false` elsewhere.
    #[inline]
    #[must_use]
    pub fn select(self, if_true: WideF32<N>, if_false: WideF32<N>) -> WideF32<N> {
        let mut out = [0.0; N];
        for lane in 0..N {
            out[lane] = if self.0[lane] {
                if_true.0[lane]
            } else {
                if_false.0[lane]
            };
        }
        WideF32(out)
    }

    /// Per-lane blend on integer lanes.
    #[inline]
    #[must_use]
    pub fn select_i32(self, if_true: WideI32<N>, if_false: WideI32<N>) -> WideI32<N> {
        let mut out = [0; N];
        for lane in 0..N {
            out[lane] = if self.0[lane] {
                if_true.0[lane]
            } else {
                if_false.0[lane]
            };
        }
        WideI32(out)
    }
}

impl<const N: usize> BitOr for WideMask<N> {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        let mut out = [false; N];
        for lane in 0..N {
            out[lane] = self.0[lane] | rhs.0[lane];
        }
        Self(out)
    }
}

impl<const N: usize> BitOrAssign for WideMask<N> {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}
