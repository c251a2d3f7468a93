//! FPGA toolchain seam.

use std::path::Path;

use acorn_platform::command::{CommandRunner, SystemRunner};
use tracing::info;

use crate::error::{BuildError, Result};

/// Runs synthesis, place and route from an emitted script.
pub trait Toolchain {
    fn name(&self) -> &str;

    /// Execute `script`. Outputs land where the script puts them.
    fn run(&mut self, script: &Path) -> Result<()>;
}

/// Xilinx Vivado in batch mode.
#[derive(Debug, Clone, Default)]
pub struct Vivado<R = SystemRunner> {
    runner: R,
}

impl Vivado<SystemRunner> {
    pub fn new() -> Self {
        Self {
            runner: SystemRunner,
        }
    }
}

impl<R: CommandRunner> Vivado<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> Toolchain for Vivado<R> {
    fn name(&self) -> &str {
        "vivado"
    }

    fn run(&mut self, script: &Path) -> Result<()> {
        info!(script = %script.display(), "running vivado");
        let args = vec![
            "-mode".to_string(),
            "batch".to_string(),
            "-nojournal".to_string(),
            "-source".to_string(),
            script.display().to_string(),
        ];
        self.runner.run("vivado", &args).map_err(|e| BuildError::Toolchain {
            tool: "vivado".to_string(),
            detail: e.to_string(),
        })
    }
}
