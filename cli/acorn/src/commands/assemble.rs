//! `acorn assemble`: derive clocks, select and assemble peripherals, then
//! optionally build, load and flash.

use std::path::{Path, PathBuf};

use acorn_build::{BuildPipeline, Toolchain, Vivado};
use acorn_clock::S7Pll;
use acorn_platform::{Board, Programmer};
use acorn_soc::{assemble_board, AssemblyOutput};
use anyhow::{Context, Result};
use tracing::info;

use super::{resolve_board, resolve_config, TargetOptions};
use crate::manifest::AcornManifest;

/// Terminal actions requested on the command line.
#[derive(Debug, Clone, Default)]
pub struct ActionOptions {
    pub output_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub build: bool,
    pub load: bool,
    pub flash: bool,
    pub flash_offset: Option<u32>,
    /// Print the assembled description as JSON instead of the report.
    pub json: bool,
}

/// Run assembly and the requested build actions.
pub fn run(
    project_dir: &Path,
    manifest: Option<&AcornManifest>,
    target: &TargetOptions,
    actions: &ActionOptions,
) -> Result<()> {
    let board = resolve_board(project_dir, manifest, target)?;
    let output = assemble(&board, manifest, target)?;

    if actions.json {
        println!("{}", acorn_build::render_json(&output.soc)?);
    } else {
        print!("{}", output.report);
    }

    if !(actions.build || actions.load || actions.flash) {
        return Ok(());
    }
    let output_dir = output_dir(project_dir, manifest, actions);
    let mut pipeline = BuildPipeline::new(
        output.soc,
        output_dir,
        Vivado::new(),
        board.create_programmer(),
    );
    let name = actions
        .name
        .clone()
        .or_else(|| manifest.and_then(|m| m.build.name.clone()));
    if let Some(name) = name {
        pipeline = pipeline.with_name(name);
    }
    let offset = actions
        .flash_offset
        .or_else(|| manifest.and_then(|m| m.build.flash_offset))
        .unwrap_or(0);
    run_actions(&mut pipeline, actions, offset)
}

/// Resolve the feature configuration against `board`, then assemble.
pub fn assemble(
    board: &Board,
    manifest: Option<&AcornManifest>,
    target: &TargetOptions,
) -> Result<AssemblyOutput> {
    let config = resolve_config(manifest, board, target)?;
    let pll = S7Pll::new(board.info().speed_grade)?;
    let output = assemble_board(&config, board, &pll)
        .with_context(|| format!("assembling SoC for {}", board.variant()))?;
    Ok(output)
}

fn output_dir(
    project_dir: &Path,
    manifest: Option<&AcornManifest>,
    actions: &ActionOptions,
) -> PathBuf {
    actions
        .output_dir
        .clone()
        .or_else(|| {
            manifest
                .and_then(|m| m.build.output_dir.as_ref())
                .map(|d| project_dir.join(d))
        })
        .unwrap_or_else(|| project_dir.join("build"))
}

/// Run build, load, flash in that order. Each runs at most once.
pub(crate) fn run_actions<T: Toolchain, P: Programmer>(
    pipeline: &mut BuildPipeline<T, P>,
    actions: &ActionOptions,
    flash_offset: u32,
) -> Result<()> {
    if actions.build {
        let artifacts = pipeline.build().context("building gateware")?;
        info!(bitstream = %artifacts.bitstream.display(), "gateware built");
        println!("Bitstream: {}", artifacts.bitstream.display());
    }
    if actions.load {
        pipeline.load().context("loading bitstream")?;
        println!("Loaded.");
    }
    if actions.flash {
        pipeline.flash(flash_offset).context("flashing bitstream")?;
        println!("Flashed at 0x{flash_offset:x}.");
    }
    Ok(())
}
