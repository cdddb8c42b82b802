//! Error types for solver operations.
//!
//! The taxonomy is deliberately small: the solver is a pure numeric routine
//! on pre-validated input. Degenerate configurations inside the math (for
//! example a contact between two static bodies) are handled silently by
//! zeroing the composite inverse mass, not by surfacing errors.

use thiserror::Error;

use crate::SolveMode;

/// Errors that can occur when invoking the solver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The configured execution mode is not available on this host.
    #[error("solve mode {mode} is not supported on this host")]
    UnsupportedMode {
        /// The rejected mode.
        mode: SolveMode,
    },

    /// The configuration is malformed.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl SolverError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check whether this is a host-capability mismatch.
    #[must_use]
    pub fn is_unsupported_mode(&self) -> bool {
        matches!(self, Self::UnsupportedMode { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolverError::UnsupportedMode {
            mode: SolveMode::Avx2,
        };
        assert!(err.to_string().contains("AVX2"));
        assert!(err.is_unsupported_mode());

        let err = SolverError::invalid_config("bad value");
        assert!(err.to_string().contains("bad value"));
        assert!(!err.is_unsupported_mode());
    }
}
