//! Assembly lifecycle.
//!
//! `Unconfigured -> ClocksDerived -> PeripheralsSelected -> Assembled -> Built`,
//! with `Failed` reachable from any non-terminal stage. Stages cannot be
//! skipped and nothing leaves `Failed`.

use std::fmt;

use serde::Serialize;

use crate::error::SocError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssemblyStage {
    Unconfigured,
    ClocksDerived,
    PeripheralsSelected,
    Assembled,
    Built,
    Failed,
}

impl AssemblyStage {
    /// The next stage on the success path.
    pub fn successor(self) -> Option<AssemblyStage> {
        match self {
            AssemblyStage::Unconfigured => Some(AssemblyStage::ClocksDerived),
            AssemblyStage::ClocksDerived => Some(AssemblyStage::PeripheralsSelected),
            AssemblyStage::PeripheralsSelected => Some(AssemblyStage::Assembled),
            AssemblyStage::Assembled => Some(AssemblyStage::Built),
            AssemblyStage::Built | AssemblyStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AssemblyStage::Built | AssemblyStage::Failed)
    }

    pub fn can_advance_to(self, next: AssemblyStage) -> bool {
        if next == AssemblyStage::Failed {
            return !self.is_terminal();
        }
        self.successor() == Some(next)
    }
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssemblyStage::Unconfigured => "unconfigured",
            AssemblyStage::ClocksDerived => "clocks-derived",
            AssemblyStage::PeripheralsSelected => "peripherals-selected",
            AssemblyStage::Assembled => "assembled",
            AssemblyStage::Built => "built",
            AssemblyStage::Failed => "failed",
        })
    }
}

/// Records the stages one run has passed through.
#[derive(Debug, Clone)]
pub struct StageTracker {
    history: Vec<AssemblyStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            history: vec![AssemblyStage::Unconfigured],
        }
    }

    pub fn current(&self) -> AssemblyStage {
        // history is never empty
        self.history
            .last()
            .copied()
            .unwrap_or(AssemblyStage::Unconfigured)
    }

    pub fn advance(&mut self, next: AssemblyStage) -> Result<(), SocError> {
        let from = self.current();
        if !from.can_advance_to(next) {
            return Err(SocError::StageSkipped { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }

    /// Move to `Failed`. No-op once terminal.
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.history.push(AssemblyStage::Failed);
        }
    }

    pub fn history(&self) -> &[AssemblyStage] {
        &self.history
    }
}
