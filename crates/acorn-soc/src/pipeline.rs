//! Assembly pipeline orchestrator.

use std::time::Instant;

use acorn_clock::{ClockResetGenerator, ClockSynthesizer};
use acorn_platform::{Board, ConstraintSet};
use tracing::{info, warn};

use crate::assemble::{assemble, AssembledSoc};
use crate::error::SocError;
use crate::report::AssemblyReport;
use crate::select::PeripheralSelector;
use crate::stage::{AssemblyStage, StageTracker};
use crate::FeatureConfig;

/// Output of a successful assembly run.
#[derive(Debug, Clone)]
pub struct AssemblyOutput {
    pub soc: AssembledSoc,
    pub report: AssemblyReport,
}

/// Run the full assembly pipeline:
/// preflight -> clocks -> peripheral selection -> assembly -> report.
///
/// Configuration errors are raised before any clock derivation.
pub fn assemble_board(
    config: &FeatureConfig,
    board: &Board,
    synth: &dyn ClockSynthesizer,
) -> Result<AssemblyOutput, SocError> {
    let mut tracker = StageTracker::new();
    match run_stages(config, board, synth, &mut tracker) {
        Ok(output) => Ok(output),
        Err(err) => {
            let stage = tracker.current();
            tracker.fail();
            warn!(%stage, error = %err, "assembly failed");
            Err(err)
        }
    }
}

fn run_stages(
    config: &FeatureConfig,
    board: &Board,
    synth: &dyn ClockSynthesizer,
    tracker: &mut StageTracker,
) -> Result<AssemblyOutput, SocError> {
    let start = Instant::now();
    let selector = PeripheralSelector::new(board);

    // Stage 0: configuration checks, no side effects
    selector.preflight(config)?;

    // Stage 1: clocks
    let with_memory = selector.memory_selected(config);
    let mut constraints = ConstraintSet::new();
    let crg = ClockResetGenerator::new(
        board,
        config.sys_clk_freq,
        with_memory,
        synth,
        &mut constraints,
    )?;
    tracker.advance(AssemblyStage::ClocksDerived)?;

    // Stage 2: peripheral selection
    let intents = selector.select(config)?;
    tracker.advance(AssemblyStage::PeripheralsSelected)?;

    // Stage 3: assembly
    let soc = assemble(crg, &intents, board, constraints, config.ident())?;
    tracker.advance(AssemblyStage::Assembled)?;

    let report = AssemblyReport::new(&soc, tracker.history(), start.elapsed().as_millis() as u64);
    info!(variant = %board.variant(), duration_ms = report.duration_ms, "assembly complete");
    Ok(AssemblyOutput { soc, report })
}
