//! Clock plan derivation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ClockDomain, DomainSource, Phase, IDELAY, SYS, SYS4X, SYS4X_DQS};
use crate::error::ClockError;
use crate::frequency::Frequency;
use crate::synth::{ClockRequest, ClockSynthesizer, PllConfig};

/// DQS capture clock offset relative to `sys4x`. Fixed by the DDR PHY.
const DQS_PHASE: Phase = Phase::degrees(90);

/// The single-ended reference input a plan is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceClock {
    /// Net name after input buffering.
    pub net: String,
    pub frequency: Frequency,
}

impl ReferenceClock {
    pub fn new(net: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            net: net.into(),
            frequency,
        }
    }
}

/// An ordered set of clock domains derived from one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockPlan {
    reference: ReferenceClock,
    domains: Vec<ClockDomain>,
    pll: Option<PllConfig>,
}

impl ClockPlan {
    /// An empty plan, for building domain sets by hand.
    pub fn new(reference: ReferenceClock) -> Self {
        Self {
            reference,
            domains: Vec::new(),
            pll: None,
        }
    }

    /// Derive the standard domain set.
    ///
    /// Always produces `sys` at `sys_clk_freq` and `idelay` tapped from the
    /// reference. With memory, also produces `sys4x` and `sys4x_dqs` at four
    /// times `sys`, the latter shifted 90 degrees.
    pub fn derive(
        reference: ReferenceClock,
        sys_clk_freq: Frequency,
        with_memory: bool,
        synth: &dyn ClockSynthesizer,
    ) -> Result<Self, ClockError> {
        let mut requests = vec![ClockRequest::new(SYS, sys_clk_freq, Phase::ZERO)];
        if with_memory {
            let sys4x = sys_clk_freq
                .checked_mul(4)
                .ok_or_else(|| ClockError::Infeasible {
                    primitive: synth.name().to_string(),
                    detail: format!("4 x {sys_clk_freq} overflows"),
                })?;
            requests.push(ClockRequest::new(SYS4X, sys4x, Phase::ZERO));
            requests.push(ClockRequest::new(SYS4X_DQS, sys4x, DQS_PHASE));
        }

        let config = synth.synthesize(reference.frequency, &requests)?;

        let mut plan = Self::new(reference);
        for (output, out) in config.outputs.iter().enumerate() {
            plan.push(
                ClockDomain::new(out.name.clone(), out.frequency, DomainSource::Pll { output })
                    .with_phase(out.phase),
            )?;
        }
        plan.push(ClockDomain::new(
            IDELAY,
            plan.reference.frequency,
            DomainSource::Reference,
        ))?;
        plan.pll = Some(config);

        for domain in &plan.domains {
            debug!(
                domain = %domain.name,
                frequency = %domain.frequency,
                phase = %domain.phase,
                ratio = %domain.frequency.ratio_to(plan.reference.frequency),
                "derived clock domain"
            );
        }
        Ok(plan)
    }

    /// Add a domain, enforcing the plan invariants.
    pub fn push(&mut self, domain: ClockDomain) -> Result<(), ClockError> {
        if domain.frequency.is_zero() {
            return Err(ClockError::ZeroFrequency { name: domain.name });
        }
        if self.contains(&domain.name) {
            return Err(ClockError::DuplicateDomain { name: domain.name });
        }
        if domain.source == DomainSource::Reference && domain.frequency != self.reference.frequency {
            return Err(ClockError::ReferenceMismatch {
                name: domain.name,
                frequency: domain.frequency,
                reference: self.reference.frequency,
            });
        }
        if !domain.phase.is_zero() && !self.domains.iter().any(|d| d.frequency == domain.frequency) {
            return Err(ClockError::PhaseWithoutBase {
                name: domain.name,
                frequency: domain.frequency,
            });
        }
        self.domains.push(domain);
        Ok(())
    }

    /// Remove a domain by name.
    pub fn remove(&mut self, name: &str) -> Option<ClockDomain> {
        let pos = self.domains.iter().position(|d| d.name == name)?;
        Some(self.domains.remove(pos))
    }

    pub fn domain(&self, name: &str) -> Option<&ClockDomain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domain(name).is_some()
    }

    pub fn domains(&self) -> &[ClockDomain] {
        &self.domains
    }

    pub fn reference(&self) -> &ReferenceClock {
        &self.reference
    }

    /// PLL configuration, if the plan was derived rather than built by hand.
    pub fn pll(&self) -> Option<&PllConfig> {
        self.pll.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::synth::S7Pll;

    fn reference() -> ReferenceClock {
        ReferenceClock::new("clk200_se", Frequency::from_mhz(200))
    }

    #[test]
    fn derive_with_memory() {
        let pll = S7Pll::new(-3).unwrap();
        let plan = ClockPlan::derive(reference(), Frequency::from_hz(156_250_000), true, &pll).unwrap();

        let names: Vec<&str> = plan.domains().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![SYS, SYS4X, SYS4X_DQS, IDELAY]);

        let sys = plan.domain(SYS).unwrap();
        assert_eq!(sys.frequency, Frequency::from_hz(156_250_000));
        assert!(sys.phase.is_zero());

        let sys4x = plan.domain(SYS4X).unwrap();
        let dqs = plan.domain(SYS4X_DQS).unwrap();
        assert_eq!(sys4x.frequency, Frequency::from_mhz(625));
        assert_eq!(dqs.frequency, sys4x.frequency);
        assert!(sys4x.phase.is_zero());
        assert_eq!(dqs.phase, Phase::degrees(90));

        let idelay = plan.domain(IDELAY).unwrap();
        assert_eq!(idelay.source, DomainSource::Reference);
        assert_eq!(idelay.frequency, Frequency::from_mhz(200));
    }

    #[test]
    fn derive_without_memory() {
        let pll = S7Pll::new(-2).unwrap();
        let plan = ClockPlan::derive(reference(), Frequency::from_mhz(100), false, &pll).unwrap();
        assert!(plan.contains(SYS));
        assert!(plan.contains(IDELAY));
        assert!(!plan.contains(SYS4X));
        assert!(!plan.contains(SYS4X_DQS));
        assert_eq!(plan.pll().unwrap().outputs.len(), 1);
    }

    #[test]
    fn derive_infeasible() {
        let pll = S7Pll::new(-1).unwrap();
        let err = ClockPlan::derive(reference(), Frequency::from_hz(99_999_999), true, &pll).unwrap_err();
        assert!(matches!(err, ClockError::Infeasible { .. }));
    }

    #[test]
    fn names_are_unique_across_derivations() {
        let pll = S7Pll::new(-2).unwrap();
        for mhz in [50, 75, 100, 125] {
            let plan = ClockPlan::derive(reference(), Frequency::from_mhz(mhz), true, &pll).unwrap();
            let names: BTreeSet<&str> = plan.domains().iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names.len(), plan.domains().len());
        }
    }

    #[test]
    fn push_rejects_duplicates_and_zero() {
        let mut plan = ClockPlan::new(reference());
        plan.push(ClockDomain::new(SYS, Frequency::from_mhz(100), DomainSource::Pll { output: 0 }))
            .unwrap();
        assert!(matches!(
            plan.push(ClockDomain::new(SYS, Frequency::from_mhz(50), DomainSource::Pll { output: 1 })),
            Err(ClockError::DuplicateDomain { .. })
        ));
        assert!(matches!(
            plan.push(ClockDomain::new("dead", Frequency::from_hz(0), DomainSource::Pll { output: 1 })),
            Err(ClockError::ZeroFrequency { .. })
        ));
    }

    #[test]
    fn phase_needs_base_domain() {
        let mut plan = ClockPlan::new(reference());
        let shifted = ClockDomain::new(SYS4X_DQS, Frequency::from_mhz(400), DomainSource::Pll { output: 1 })
            .with_phase(Phase::degrees(90));
        assert!(matches!(
            plan.push(shifted.clone()),
            Err(ClockError::PhaseWithoutBase { .. })
        ));
        plan.push(ClockDomain::new(SYS4X, Frequency::from_mhz(400), DomainSource::Pll { output: 0 }))
            .unwrap();
        plan.push(shifted).unwrap();
    }

    #[test]
    fn reference_domain_must_match_input() {
        let mut plan = ClockPlan::new(reference());
        let err = plan
            .push(ClockDomain::new(IDELAY, Frequency::from_mhz(100), DomainSource::Reference))
            .unwrap_err();
        assert!(matches!(err, ClockError::ReferenceMismatch { .. }));
    }

    #[test]
    fn remove_domain() {
        let pll = S7Pll::new(-2).unwrap();
        let mut plan = ClockPlan::derive(reference(), Frequency::from_mhz(100), false, &pll).unwrap();
        assert!(plan.remove(SYS).is_some());
        assert!(!plan.contains(SYS));
        assert!(plan.remove(SYS).is_none());
    }
}
