//! Error taxonomy shared by all engines.
//!
//! Two classes: invalid configuration detected at component entry
//! (domain errors) and physically valid inputs for which a quantity is
//! undefined (numerical degeneracy). Neither is recovered internally.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReversalError {
    #[error("particle count must be > 0")]
    NoParticles,
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
    #[error("total time must be non-negative and finite, got {0}")]
    InvalidTotalTime(f64),
    #[error("grid resolution must be > 0")]
    ZeroGridSize,
    #[error("domain extent must be positive and finite, got {0}")]
    InvalidDomainExtent(f64),
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("wave grid needs at least 2 points, got {0}")]
    GridTooSmall(usize),
    #[error("length mismatch: {what} has {got} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("position grid is not evenly spaced at index {index}")]
    NonUniformGrid { index: usize },
    #[error("wavenumber {index} is {got}, expected {expected} for this position grid")]
    InconsistentWavenumbers { index: usize, expected: f64, got: f64 },
    #[error("pairwise distance undefined for {0} particle(s)")]
    TooFewParticles(usize),
}

impl ReversalError {
    /// Invalid configuration, caught before any computation.
    pub fn is_domain_error(&self) -> bool {
        !self.is_degeneracy()
    }

    /// Valid physical input for which the requested quantity does not exist.
    pub fn is_degeneracy(&self) -> bool {
        matches!(self, ReversalError::TooFewParticles(_))
    }
}

pub type Result<T> = std::result::Result<T, ReversalError>;

/// Reject values that are not strictly positive and finite.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReversalError::NonPositive { name, value })
    }
}
