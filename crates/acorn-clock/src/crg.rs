//! Clock/reset generator.
//!
//! Binds a [`ClockPlan`] to the board's differential reference input, adds
//! the CRG reset line and (with memory) the IDELAYCTRL block. Board timing
//! workarounds are applied by [`register_reset_false_path`] as a separate,
//! named step so a variant can opt out without touching the plan.

use acorn_platform::board::{REFERENCE_CLOCK_HZ, REFERENCE_CLOCK_NET};
use acorn_platform::{Board, ConstraintSet, PlatformError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ClockDomain, IDELAY, SYS};
use crate::error::ClockError;
use crate::frequency::Frequency;
use crate::plan::{ClockPlan, ReferenceClock};
use crate::synth::ClockSynthesizer;

/// Pin group carrying the reference oscillator.
pub const REFERENCE_GROUP: &str = "clk200";

/// Reference cycles IDELAYCTRL is held in reset before calibration starts.
pub const IDELAYCTRL_RESET_CYCLES: u32 = 64;

/// The CRG's reset input. Asserting it resets the PLL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetLine {
    pub name: String,
}

/// What can hold a synthesized domain in reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetSource {
    PllUnlocked,
    ResetLine,
}

/// Synchronized reset for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainReset {
    pub domain: String,
    pub sources: Vec<ResetSource>,
}

/// IDELAYCTRL calibration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdelayCtrl {
    /// Domain the block's reference clock and reset counter run on.
    pub domain: String,
    pub reset_cycles: u32,
}

/// Clock/reset generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockResetGenerator {
    reset: ResetLine,
    plan: ClockPlan,
    domain_resets: Vec<DomainReset>,
    idelayctrl: Option<IdelayCtrl>,
}

impl ClockResetGenerator {
    /// Build the CRG for `board`.
    ///
    /// Registers the reference period constraint and, if the variant asks for
    /// it, the reset false path.
    pub fn new(
        board: &Board,
        sys_clk_freq: Frequency,
        with_memory: bool,
        synth: &dyn ClockSynthesizer,
        constraints: &mut ConstraintSet,
    ) -> Result<Self, ClockError> {
        let group = board
            .resources()
            .lookup(REFERENCE_GROUP, 0)
            .ok_or_else(|| PlatformError::MissingResource {
                name: REFERENCE_GROUP.to_string(),
                index: Some(0),
            })?;
        if !group.is_differential() {
            return Err(PlatformError::Validation {
                detail: format!("{REFERENCE_GROUP} must be a differential pair"),
            }
            .into());
        }
        constraints.add_period(format!("{REFERENCE_GROUP}_p"), REFERENCE_CLOCK_HZ);

        let reference = ReferenceClock::new(REFERENCE_CLOCK_NET, Frequency::from_hz(REFERENCE_CLOCK_HZ));
        let plan = ClockPlan::derive(reference, sys_clk_freq, with_memory, synth)?;

        let crg = Self::from_plan(plan, with_memory);
        if board.info().reset_false_path {
            register_reset_false_path(&crg.plan, constraints);
        }

        info!(
            variant = %board.variant(),
            sys = %sys_clk_freq,
            domains = crg.plan.domains().len(),
            "clocks derived"
        );
        Ok(crg)
    }

    /// Wrap a plan without touching any board or constraint state.
    pub fn from_plan(plan: ClockPlan, with_idelayctrl: bool) -> Self {
        let domain_resets = plan
            .domains()
            .iter()
            .filter(|d| d.is_synthesized())
            .map(|d| DomainReset {
                domain: d.name.clone(),
                sources: vec![ResetSource::PllUnlocked, ResetSource::ResetLine],
            })
            .collect();
        let idelayctrl = (with_idelayctrl && plan.contains(IDELAY)).then(|| IdelayCtrl {
            domain: IDELAY.to_string(),
            reset_cycles: IDELAYCTRL_RESET_CYCLES,
        });
        Self {
            reset: ResetLine {
                name: "crg_rst".to_string(),
            },
            plan,
            domain_resets,
            idelayctrl,
        }
    }

    pub fn reset(&self) -> &ResetLine {
        &self.reset
    }

    pub fn plan(&self) -> &ClockPlan {
        &self.plan
    }

    pub fn domains(&self) -> &[ClockDomain] {
        self.plan.domains()
    }

    pub fn domain(&self, name: &str) -> Option<&ClockDomain> {
        self.plan.domain(name)
    }

    pub fn has_domain(&self, name: &str) -> bool {
        self.plan.contains(name)
    }

    pub fn domain_resets(&self) -> &[DomainReset] {
        &self.domain_resets
    }

    pub fn idelayctrl(&self) -> Option<&IdelayCtrl> {
        self.idelayctrl.as_ref()
    }

    /// Which domains run for a given reset/lock combination.
    pub fn state(&self, reset_asserted: bool, pll_locked: bool) -> CrgState {
        let entries = self
            .plan
            .domains()
            .iter()
            .map(|d| {
                let status = if !d.is_synthesized() || (!reset_asserted && pll_locked) {
                    DomainStatus::Running
                } else {
                    DomainStatus::HeldInReset
                };
                (d.name.clone(), status)
            })
            .collect();
        CrgState { entries }
    }
}

/// Suppress the `sys` -> reference path created by the SoC reset fan-out.
///
/// This is a board-level workaround, not a property of the plan. It is a
/// no-op for plans without a `sys` domain.
pub fn register_reset_false_path(plan: &ClockPlan, constraints: &mut ConstraintSet) {
    if !plan.contains(SYS) {
        return;
    }
    let from = format!("{SYS}_clk");
    let to = plan.reference().net.clone();
    debug!(%from, %to, "registering reset false path");
    constraints.add_false_path(from, to, "sys reset fan-out into PLL input");
}

/// Run state of one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    Running,
    HeldInReset,
}

/// Snapshot of every domain's run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrgState {
    entries: Vec<(String, DomainStatus)>,
}

impl CrgState {
    pub fn status(&self, domain: &str) -> Option<DomainStatus> {
        self.entries
            .iter()
            .find(|(name, _)| name == domain)
            .map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DomainStatus)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), *s))
    }
}

/// Behavioural model of the IDELAYCTRL reset/calibration sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdelayCalibration {
    reset_cycles: u32,
    remaining: u32,
}

impl IdelayCalibration {
    pub fn new(ctrl: &IdelayCtrl) -> Self {
        Self {
            reset_cycles: ctrl.reset_cycles,
            remaining: ctrl.reset_cycles,
        }
    }

    /// Advance one reference cycle. Nothing happens while the domain is stopped.
    pub fn tick(&mut self, domain: DomainStatus) {
        if domain == DomainStatus::Running {
            self.remaining = self.remaining.saturating_sub(1);
        }
    }

    /// Restart calibration.
    pub fn retrigger(&mut self) {
        self.remaining = self.reset_cycles;
    }

    /// Whether the memory controller may start using the delay lines.
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }
}
