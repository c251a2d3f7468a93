//! Assembly errors.
//!
//! Every error aborts the whole assembly run; nothing is retried or
//! downgraded to a default.

use acorn_clock::ClockError;
use acorn_platform::{BoardVariant, PlatformError};
use thiserror::Error;

use crate::intent::IntentKind;
use crate::stage::AssemblyStage;

/// Errors that can occur while assembling a SoC.
#[derive(Debug, Error)]
pub enum SocError {
    #[error("infeasible clock plan: {0}")]
    InfeasibleClockPlan(#[source] ClockError),

    #[error("{intent} peripheral requires clock domain '{domain}', which the clock plan does not provide")]
    UnsatisfiedClockDependency { intent: IntentKind, domain: String },

    #[error("{feature} is not available on board variant {variant}")]
    UnsupportedFeatureForVariant {
        feature: String,
        variant: BoardVariant,
    },

    #[error("malformed {parameter}: '{value}'")]
    MalformedAddressingParameter { parameter: String, value: String },

    #[error("peripheral intents out of order: {found} after {previous}")]
    IntentOrder {
        previous: IntentKind,
        found: IntentKind,
    },

    #[error("configuration targets {config} but the board is {board}")]
    VariantMismatch {
        config: BoardVariant,
        board: BoardVariant,
    },

    #[error("assembly cannot move from {from} to {to}")]
    StageSkipped { from: AssemblyStage, to: AssemblyStage },

    #[error("board error: {0}")]
    Platform(#[from] PlatformError),
}

impl From<ClockError> for SocError {
    fn from(err: ClockError) -> Self {
        match err {
            ClockError::Platform(inner) => SocError::Platform(inner),
            other => SocError::InfeasibleClockPlan(other),
        }
    }
}
