//! Build / load / flash orchestration.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use acorn_platform::Programmer;
use acorn_soc::{AssembledSoc, AssemblyStage};
use tracing::{info, warn};

use crate::emit::{render_json, render_tcl, render_xdc};
use crate::error::{BuildError, Result};
use crate::toolchain::Toolchain;

pub const DEFAULT_BUILD_NAME: &str = "acorn";

/// The three terminal actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildAction {
    Build,
    Load,
    Flash,
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildAction::Build => "build",
            BuildAction::Load => "load",
            BuildAction::Flash => "flash",
        })
    }
}

/// Files produced by a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifacts {
    pub json: PathBuf,
    pub xdc: PathBuf,
    pub tcl: PathBuf,
    /// Volatile ("sram") bitstream.
    pub bitstream: PathBuf,
    /// Flash image.
    pub flash_image: PathBuf,
}

/// Owns one assembled SoC and runs its terminal actions.
pub struct BuildPipeline<T, P> {
    soc: AssembledSoc,
    name: String,
    output_dir: PathBuf,
    toolchain: T,
    programmer: P,
    stage: AssemblyStage,
    invoked: BTreeSet<BuildAction>,
    artifacts: Option<BuildArtifacts>,
}

impl<T: Toolchain, P: Programmer> BuildPipeline<T, P> {
    pub fn new(soc: AssembledSoc, output_dir: impl Into<PathBuf>, toolchain: T, programmer: P) -> Self {
        Self {
            soc,
            name: DEFAULT_BUILD_NAME.to_string(),
            output_dir: output_dir.into(),
            toolchain,
            programmer,
            stage: AssemblyStage::Assembled,
            invoked: BTreeSet::new(),
            artifacts: None,
        }
    }

    /// Override the artifact base name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn soc(&self) -> &AssembledSoc {
        &self.soc
    }

    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    pub fn artifacts(&self) -> Option<&BuildArtifacts> {
        self.artifacts.as_ref()
    }

    pub fn programmer(&self) -> &P {
        &self.programmer
    }

    /// `<output>/gateware`.
    pub fn gateware_dir(&self) -> PathBuf {
        self.output_dir.join("gateware")
    }

    fn claim(&mut self, action: BuildAction) -> Result<()> {
        if !self.invoked.insert(action) {
            return Err(BuildError::AlreadyInvoked { action });
        }
        Ok(())
    }

    /// Emit artifacts and run the toolchain.
    pub fn build(&mut self) -> Result<&BuildArtifacts> {
        self.claim(BuildAction::Build)?;
        match self.run_build() {
            Ok(artifacts) => {
                self.stage = AssemblyStage::Built;
                info!(bitstream = %artifacts.bitstream.display(), "build complete");
                Ok(self.artifacts.insert(artifacts))
            }
            Err(err) => {
                self.stage = AssemblyStage::Failed;
                warn!(error = %err, "build failed");
                Err(err)
            }
        }
    }

    fn run_build(&mut self) -> Result<BuildArtifacts> {
        let dir = self.gateware_dir();
        fs::create_dir_all(&dir).map_err(|source| BuildError::Io {
            path: dir.clone(),
            source,
        })?;

        let artifacts = BuildArtifacts {
            json: dir.join(format!("{}.json", self.name)),
            xdc: dir.join(format!("{}.xdc", self.name)),
            tcl: dir.join(format!("{}.tcl", self.name)),
            bitstream: dir.join(format!("{}.bit", self.name)),
            flash_image: dir.join(format!("{}.bin", self.name)),
        };
        write(&artifacts.json, &render_json(&self.soc)?)?;
        write(&artifacts.xdc, &render_xdc(&self.soc))?;
        write(
            &artifacts.tcl,
            &render_tcl(&self.soc, &self.name, &dir.display().to_string()),
        )?;

        self.toolchain.run(&artifacts.tcl)?;

        for path in [&artifacts.bitstream, &artifacts.flash_image] {
            if !path.is_file() {
                return Err(BuildError::MissingArtifact { path: path.clone() });
            }
        }
        Ok(artifacts)
    }

    fn built_artifacts(&self, action: BuildAction) -> Result<&BuildArtifacts> {
        match (&self.artifacts, self.stage) {
            (Some(artifacts), AssemblyStage::Built) => Ok(artifacts),
            _ => Err(BuildError::NotBuilt { action }),
        }
    }

    /// Load the volatile bitstream over JTAG.
    pub fn load(&mut self) -> Result<()> {
        let bitstream = self.built_artifacts(BuildAction::Load)?.bitstream.clone();
        self.claim(BuildAction::Load)?;
        info!(bitstream = %bitstream.display(), "loading");
        self.programmer.load_bitstream(&bitstream)?;
        Ok(())
    }

    /// Write the flash image at `offset`.
    pub fn flash(&mut self, offset: u32) -> Result<()> {
        let image = self.built_artifacts(BuildAction::Flash)?.flash_image.clone();
        self.claim(BuildAction::Flash)?;
        info!(image = %image.display(), offset, "flashing");
        self.programmer.flash(offset, &image)?;
        Ok(())
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
