//! Clock domain definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frequency::Frequency;

/// System domain name.
pub const SYS: &str = "sys";
/// 4x system domain used by the DDR PHY command/control path.
pub const SYS4X: &str = "sys4x";
/// 4x system domain shifted 90 degrees for DQS alignment.
pub const SYS4X_DQS: &str = "sys4x_dqs";
/// IDELAYCTRL reference domain.
pub const IDELAY: &str = "idelay";

/// Phase offset in whole degrees, `0..360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(u16);

impl Phase {
    pub const ZERO: Phase = Phase(0);

    /// Phase in degrees, normalized into `0..360`.
    pub const fn degrees(degrees: u16) -> Self {
        Self(degrees % 360)
    }

    pub const fn as_degrees(self) -> u16 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Where a domain's clock comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DomainSource {
    /// A PLL output, by output index.
    Pll { output: usize },
    /// The buffered reference input, bypassing the PLL.
    Reference,
}

/// A named logical clock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockDomain {
    pub name: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub phase: Phase,
    pub source: DomainSource,
}

impl ClockDomain {
    pub fn new(name: impl Into<String>, frequency: Frequency, source: DomainSource) -> Self {
        Self {
            name: name.into(),
            frequency,
            phase: Phase::ZERO,
            source,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Whether the domain is gated by PLL lock.
    pub fn is_synthesized(&self) -> bool {
        matches!(self.source, DomainSource::Pll { .. })
    }
}

impl fmt::Display for ClockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} @ {}", self.name, self.frequency, self.phase)?;
        if let DomainSource::Reference = self.source {
            write!(f, " (reference)")?;
        }
        Ok(())
    }
}
