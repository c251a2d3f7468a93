//! Clock-domain derivation for Acorn SoC builds.
//!
//! A [`ClockPlan`] turns one reference input and a target system frequency
//! into a set of named domains with exact frequency and phase relationships.
//! The [`ClockResetGenerator`] binds a plan to the board's reference pins,
//! adds the reset line and the IDELAYCTRL calibration domain, and applies
//! the board's timing workarounds as an explicit step.

pub mod crg;
pub mod domain;
pub mod error;
pub mod frequency;
pub mod plan;
pub mod synth;

pub use crg::{ClockResetGenerator, CrgState, DomainStatus, IdelayCalibration, IdelayCtrl, ResetLine};
pub use domain::{ClockDomain, DomainSource, Phase};
pub use error::ClockError;
pub use frequency::{Frequency, Ratio};
pub use plan::{ClockPlan, ReferenceClock};
pub use synth::{ClockRequest, ClockSynthesizer, PllConfig, PllOutput, S7Pll};
