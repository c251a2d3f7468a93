//! JTAG programmer handle.

use std::path::Path;

use crate::command::{CommandRunner, SystemRunner};
use crate::error::Result;

/// Loads or flashes a bitstream onto the board.
pub trait Programmer {
    /// Load a bitstream into volatile configuration memory.
    fn load_bitstream(&mut self, bitstream: &Path) -> Result<()>;

    /// Write a bitstream into configuration flash at `offset`.
    fn flash(&mut self, offset: u32, bitstream: &Path) -> Result<()>;
}

/// OpenOCD over an FT2232 JTAG adapter.
#[derive(Debug, Clone)]
pub struct OpenOcd<R = SystemRunner> {
    config: String,
    flash_proxy: String,
    runner: R,
}

/// Adapter configuration used by the Acorn baseboard.
pub const OPENOCD_CONFIG: &str = "openocd_xc7_ft2232.cfg";

impl OpenOcd<SystemRunner> {
    pub fn new(config: impl Into<String>, flash_proxy: impl Into<String>) -> Self {
        Self::with_runner(config, flash_proxy, SystemRunner)
    }
}

impl<R: CommandRunner> OpenOcd<R> {
    pub fn with_runner(config: impl Into<String>, flash_proxy: impl Into<String>, runner: R) -> Self {
        Self {
            config: config.into(),
            flash_proxy: flash_proxy.into(),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn call(&mut self, script: &[String]) -> Result<()> {
        let args = vec!["-f".to_string(), self.config.clone(), "-c".to_string(), script.join("; ")];
        self.runner.run("openocd", &args)
    }
}

impl<R: CommandRunner> Programmer for OpenOcd<R> {
    fn load_bitstream(&mut self, bitstream: &Path) -> Result<()> {
        let script = vec![
            "init".to_string(),
            format!("pld load 0 {{{}}}", bitstream.display()),
            "exit".to_string(),
        ];
        self.call(&script)
    }

    fn flash(&mut self, offset: u32, bitstream: &Path) -> Result<()> {
        let script = vec![
            "init".to_string(),
            format!("jtagspi_init 0 {{{}}}", self.flash_proxy),
            format!("jtagspi_program {{{}}} 0x{:x}", bitstream.display(), offset),
            "fpga_program".to_string(),
            "exit".to_string(),
        ];
        self.call(&script)
    }
}
