//! Assembly report.

use std::fmt;

use acorn_clock::{ClockDomain, PllConfig};

use crate::assemble::AssembledSoc;
use crate::peripheral::Peripheral;
use crate::stage::AssemblyStage;

/// Summary of one assembly run.
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    pub ident: String,
    pub variant: String,
    pub device: String,
    pub duration_ms: u64,
    pub domains: Vec<ClockDomain>,
    pub pll: Option<PllConfig>,
    pub idelayctrl: bool,
    /// One line per instantiated peripheral.
    pub peripherals: Vec<String>,
    pub uart: bool,
    pub constraints: usize,
    pub pins_claimed: usize,
    pub stages: Vec<AssemblyStage>,
}

impl AssemblyReport {
    pub fn new(soc: &AssembledSoc, stages: &[AssemblyStage], duration_ms: u64) -> Self {
        Self {
            ident: soc.ident().to_string(),
            variant: soc.variant().to_string(),
            device: soc.device().to_string(),
            duration_ms,
            domains: soc.crg().domains().to_vec(),
            pll: soc.crg().plan().pll().cloned(),
            idelayctrl: soc.crg().idelayctrl().is_some(),
            peripherals: soc.peripherals().iter().map(describe).collect(),
            uart: soc.uart().is_some(),
            constraints: soc.constraints().len(),
            pins_claimed: soc.pins().len(),
            stages: stages.to_vec(),
        }
    }
}

fn describe(peripheral: &Peripheral) -> String {
    match peripheral {
        Peripheral::Memory(dram) => format!(
            "memory: {} {} {} ({} phases), L2 {} bytes",
            dram.memtype, dram.module, dram.rate, dram.nphases, dram.l2_cache_size
        ),
        Peripheral::Network(phy) => format!(
            "network: {} on {} at {} Mb/s, {:?}",
            phy.kind,
            phy.refclk_domain,
            phy.line_rate / 1_000_000,
            phy.bridge
        ),
        Peripheral::Status(chaser) => format!(
            "status: LED chaser over {} LEDs, {} ms period",
            chaser.pads.len(),
            chaser.period_ms
        ),
    }
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Assembly Report ===")?;
        writeln!(f, "Ident: {}", self.ident)?;
        writeln!(f, "Board: {} ({})", self.variant, self.device)?;
        writeln!(f, "Duration: {} ms", self.duration_ms)?;
        writeln!(f)?;

        writeln!(f, "--- Clock Domains ({}) ---", self.domains.len())?;
        for domain in &self.domains {
            writeln!(f, "  {domain}")?;
        }
        if let Some(pll) = &self.pll {
            writeln!(
                f,
                "  {}: D={} M={} VCO={}",
                pll.primitive, pll.divclk_divide, pll.clkfbout_mult, pll.vco
            )?;
        }
        writeln!(
            f,
            "  IDELAYCTRL: {}",
            if self.idelayctrl { "yes" } else { "no" }
        )?;

        writeln!(f)?;
        writeln!(f, "--- Peripherals ({}) ---", self.peripherals.len())?;
        if self.uart {
            writeln!(f, "  uart: serial console")?;
        }
        for line in &self.peripherals {
            writeln!(f, "  {line}")?;
        }

        writeln!(f)?;
        writeln!(f, "Constraints: {}", self.constraints)?;
        writeln!(f, "Pin groups claimed: {}", self.pins_claimed)?;
        let stages: Vec<String> = self.stages.iter().map(|s| s.to_string()).collect();
        writeln!(f, "Stages: {}", stages.join(" -> "))?;
        Ok(())
    }
}
