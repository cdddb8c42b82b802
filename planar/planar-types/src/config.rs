//! Solver configuration.

use crate::SolverError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Execution mode for the solver.
///
/// The mode selects the SIMD batch width: contacts are grouped into
/// body-disjoint lane groups of this width and solved as one batch. The
/// iteration kernels are portable width-generic code; the 4- and 8-wide
/// batches are laid out so the autovectoriser maps them onto 128- and
/// 256-bit registers on hosts that have them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveMode {
    /// Width-1 batches: one contact at a time.
    Scalar,
    /// Width-4 batches (128-bit lanes).
    Sse2,
    /// Width-8 batches (256-bit lanes).
    Avx2,
}

impl SolveMode {
    /// SIMD lane width selected by this mode.
    #[must_use]
    pub const fn lane_width(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Sse2 => 4,
            Self::Avx2 => 8,
        }
    }

    /// Whether the running host can execute this mode profitably.
    #[must_use]
    pub fn is_supported(self) -> bool {
        match self {
            Self::Scalar => true,
            Self::Sse2 => lanes_128_available(),
            Self::Avx2 => lanes_256_available(),
        }
    }

    /// The widest mode supported on the running host.
    #[must_use]
    pub fn widest_supported() -> Self {
        if Self::Avx2.is_supported() {
            Self::Avx2
        } else if Self::Sse2.is_supported() {
            Self::Sse2
        } else {
            Self::Scalar
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn lanes_128_available() -> bool {
    std::arch::is_x86_feature_detected!("sse2")
}

// NEON is baseline on aarch64 and covers 128-bit lanes.
#[cfg(target_arch = "aarch64")]
fn lanes_128_available() -> bool {
    true
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn lanes_128_available() -> bool {
    false
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn lanes_256_available() -> bool {
    std::arch::is_x86_feature_detected!("avx2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn lanes_256_available() -> bool {
    false
}

impl std::fmt::Display for SolveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => write!(f, "Scalar"),
            Self::Sse2 => write!(f, "SSE2"),
            Self::Avx2 => write!(f, "AVX2"),
        }
    }
}

/// Configuration for one solve call.
///
/// # Example
///
/// ```
/// use planar_types::{SolveConfig, SolveMode};
///
/// let config = SolveConfig::default().with_mode(SolveMode::Scalar);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveConfig {
    /// Execution mode; must match host capabilities.
    pub mode: SolveMode,

    /// Maximum velocity (impulse) iterations. The solver terminates early
    /// once an entire iteration applies no productive impulse.
    pub velocity_iterations: usize,

    /// Maximum displacement (position correction) iterations.
    pub position_iterations: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            mode: SolveMode::widest_supported(),
            velocity_iterations: 15,
            position_iterations: 15,
        }
    }
}

impl SolveConfig {
    /// Fast configuration for real-time scenes that tolerate softer stacks.
    #[must_use]
    pub fn realtime() -> Self {
        Self {
            velocity_iterations: 8,
            position_iterations: 4,
            ..Self::default()
        }
    }

    /// High-accuracy configuration for tall stacks and stress scenes.
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            velocity_iterations: 30,
            position_iterations: 30,
            ..Self::default()
        }
    }

    /// Set the execution mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: SolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the maximum velocity iterations.
    #[must_use]
    pub const fn with_velocity_iterations(mut self, iterations: usize) -> Self {
        self.velocity_iterations = iterations;
        self
    }

    /// Set the maximum displacement iterations.
    #[must_use]
    pub const fn with_position_iterations(mut self, iterations: usize) -> Self {
        self.position_iterations = iterations;
        self
    }

    /// Validate the configuration against the running host.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::UnsupportedMode`] when the selected mode's
    /// lane width is not available on this host, and
    /// [`SolverError::InvalidConfig`] when both iteration counts are zero
    /// (a solve that can never apply an impulse). Either pass alone may be
    /// disabled. The checks run before any iteration begins.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.mode.is_supported() {
            return Err(SolverError::UnsupportedMode { mode: self.mode });
        }
        if self.velocity_iterations == 0 && self.position_iterations == 0 {
            return Err(SolverError::invalid_config(
                "velocity_iterations and position_iterations cannot both be zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_widths() {
        assert_eq!(SolveMode::Scalar.lane_width(), 1);
        assert_eq!(SolveMode::Sse2.lane_width(), 4);
        assert_eq!(SolveMode::Avx2.lane_width(), 8);
    }

    #[test]
    fn test_scalar_always_supported() {
        assert!(SolveMode::Scalar.is_supported());
        assert!(SolveMode::widest_supported().is_supported());
    }

    #[test]
    fn test_default_config_validates() {
        let config = SolveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.velocity_iterations, 15);
        assert_eq!(config.position_iterations, 15);
    }

    #[test]
    fn test_builders() {
        let config = SolveConfig::default()
            .with_mode(SolveMode::Scalar)
            .with_velocity_iterations(5)
            .with_position_iterations(3);

        assert_eq!(config.mode, SolveMode::Scalar);
        assert_eq!(config.velocity_iterations, 5);
        assert_eq!(config.position_iterations, 3);
    }

    #[test]
    fn test_presets() {
        assert!(SolveConfig::realtime().velocity_iterations < 15);
        assert!(SolveConfig::high_accuracy().velocity_iterations > 15);
    }

    #[test]
    fn test_zero_iteration_config_is_rejected() {
        let config = SolveConfig::default()
            .with_velocity_iterations(0)
            .with_position_iterations(0);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig { .. }));
        assert!(err.to_string().contains("cannot both be zero"));

        // Disabling a single pass stays valid.
        assert!(SolveConfig::default()
            .with_velocity_iterations(0)
            .validate()
            .is_ok());
        assert!(SolveConfig::default()
            .with_position_iterations(0)
            .validate()
            .is_ok());
    }
}
