//! Dependency gate: decides whether a set of intents may be wired to a CRG.

use acorn_clock::ClockResetGenerator;

use crate::error::SocError;
use crate::intent::{IntentKind, PeripheralIntent};

/// The gate's decision on whether assembly may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Every required domain exists.
    Pass,
    /// The first intent (in list order) with a missing domain.
    Halt { intent: IntentKind, domain: String },
}

/// Check every intent's required domains against the CRG.
pub fn dependency_gate(crg: &ClockResetGenerator, intents: &[PeripheralIntent]) -> GateDecision {
    for intent in intents {
        if let Some(domain) = intent
            .required_domains()
            .iter()
            .find(|d| !crg.has_domain(d))
        {
            return GateDecision::Halt {
                intent: intent.kind(),
                domain: domain.clone(),
            };
        }
    }
    GateDecision::Pass
}

/// Run the dependency gate and return an error if it halts.
pub fn gate_or_halt(crg: &ClockResetGenerator, intents: &[PeripheralIntent]) -> Result<(), SocError> {
    match dependency_gate(crg, intents) {
        GateDecision::Pass => Ok(()),
        GateDecision::Halt { intent, domain } => {
            Err(SocError::UnsatisfiedClockDependency { intent, domain })
        }
    }
}

/// Intents must arrive as memory, network, status, each at most once.
pub fn check_order(intents: &[PeripheralIntent]) -> Result<(), SocError> {
    for pair in intents.windows(2) {
        let (previous, found) = (pair[0].kind(), pair[1].kind());
        if found <= previous {
            return Err(SocError::IntentOrder { previous, found });
        }
    }
    Ok(())
}
