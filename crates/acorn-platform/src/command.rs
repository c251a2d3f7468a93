//! External command execution seam.

use std::process::Command;

use tracing::debug;

use crate::error::{PlatformError, Result};

/// Runs an external program to completion.
pub trait CommandRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<()>;
}

/// Runs programs on the host with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<()> {
        debug!(program, ?args, "spawning");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| PlatformError::CommandFailed {
                program: program.to_string(),
                status: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(PlatformError::CommandFailed {
                program: program.to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// Records invocations instead of running them.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    pub calls: Vec<(String, Vec<String>)>,
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<()> {
        self.calls.push((program.to_string(), args.to_vec()));
        Ok(())
    }
}
