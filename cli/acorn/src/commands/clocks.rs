//! `acorn clocks`: derive and print the clock plan without assembling peripherals.

use std::fmt::Write as _;
use std::path::Path;

use acorn_clock::crg::ResetSource;
use acorn_clock::{ClockResetGenerator, S7Pll};
use acorn_platform::ConstraintSet;
use acorn_soc::PeripheralSelector;
use anyhow::{Context, Result};

use super::{resolve_board, resolve_config, TargetOptions};
use crate::manifest::AcornManifest;

pub fn run(
    project_dir: &Path,
    manifest: Option<&AcornManifest>,
    target: &TargetOptions,
) -> Result<()> {
    let (crg, constraints) = derive(project_dir, manifest, target)?;
    print!("{}", render(&crg, &constraints));
    Ok(())
}

pub(crate) fn derive(
    project_dir: &Path,
    manifest: Option<&AcornManifest>,
    target: &TargetOptions,
) -> Result<(ClockResetGenerator, ConstraintSet)> {
    let board = resolve_board(project_dir, manifest, target)?;
    let config = resolve_config(manifest, &board, target)?;
    let with_memory = PeripheralSelector::new(&board).memory_selected(&config);
    let pll = S7Pll::new(board.info().speed_grade)?;
    let mut constraints = ConstraintSet::new();
    let crg = ClockResetGenerator::new(
        &board,
        config.sys_clk_freq,
        with_memory,
        &pll,
        &mut constraints,
    )
    .with_context(|| format!("deriving clocks for {}", board.variant()))?;
    Ok((crg, constraints))
}

pub(crate) fn render(crg: &ClockResetGenerator, constraints: &ConstraintSet) -> String {
    let mut out = String::new();
    let reference = crg.plan().reference();
    let _ = writeln!(out, "=== Clock Plan ===");
    let _ = writeln!(out, "Reference: {} at {}", reference.net, reference.frequency);
    let _ = writeln!(out);

    let _ = writeln!(out, "--- Domains ---");
    for domain in crg.domains() {
        let _ = writeln!(out, "  {domain}");
    }
    if let Some(pll) = crg.plan().pll() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- {} ---", pll.primitive);
        let _ = writeln!(
            out,
            "  DIVCLK_DIVIDE={} CLKFBOUT_MULT={} VCO={}",
            pll.divclk_divide, pll.clkfbout_mult, pll.vco
        );
        for (i, output) in pll.outputs.iter().enumerate() {
            let _ = writeln!(
                out,
                "  CLKOUT{i}: {} /{} = {} @ {}",
                output.name, output.divide, output.frequency, output.phase
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Resets ({}) ---", crg.reset().name);
    for reset in crg.domain_resets() {
        let sources: Vec<&str> = reset
            .sources
            .iter()
            .map(|s| match s {
                ResetSource::PllUnlocked => "pll-unlocked",
                ResetSource::ResetLine => "reset-line",
            })
            .collect();
        let _ = writeln!(out, "  {}: {}", reset.domain, sources.join(" | "));
    }
    match crg.idelayctrl() {
        Some(ctrl) => {
            let _ = writeln!(
                out,
                "  IDELAYCTRL on {} ({} reset cycles)",
                ctrl.domain, ctrl.reset_cycles
            );
        }
        None => {
            let _ = writeln!(out, "  IDELAYCTRL: none");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Constraints ({}) ---", constraints.len());
    for constraint in constraints.iter() {
        let _ = writeln!(out, "  {constraint}");
    }
    out
}
