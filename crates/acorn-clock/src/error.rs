//! Clock derivation errors.

use acorn_platform::PlatformError;
use thiserror::Error;

use crate::frequency::Frequency;

/// Errors raised while building a clock plan or clock/reset generator.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("clock domain '{name}' has zero frequency")]
    ZeroFrequency { name: String },

    #[error("clock domain '{name}' defined twice")]
    DuplicateDomain { name: String },

    #[error("domain '{name}' has a phase offset but no in-phase domain runs at {frequency}")]
    PhaseWithoutBase { name: String, frequency: Frequency },

    #[error("domain '{name}' is tapped from the reference but runs at {frequency}, reference is {reference}")]
    ReferenceMismatch {
        name: String,
        frequency: Frequency,
        reference: Frequency,
    },

    #[error("{primitive}: {detail}")]
    Infeasible { primitive: String, detail: String },

    #[error("unsupported speed grade {0}")]
    UnknownSpeedGrade(i8),

    #[error("reference clock: {0}")]
    Platform(#[from] PlatformError),
}
