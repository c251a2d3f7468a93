//! Complete board model.
//!
//! Combines a variant row with its physical resource map and the capability
//! flags the SoC core queries before deciding what to instantiate.

use crate::programmer::{OpenOcd, OPENOCD_CONFIG};
use crate::resource::PhysicalResourceMap;
use crate::variant::{BoardVariant, VariantInfo};

/// Net name of the single-ended reference clock after the differential input buffer.
pub const REFERENCE_CLOCK_NET: &str = "clk200_se";

/// Frequency of the on-module reference oscillator.
pub const REFERENCE_CLOCK_HZ: u64 = 200_000_000;

/// A board the SoC is being assembled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    variant: BoardVariant,
    resources: PhysicalResourceMap,
    integrated_main_ram_size: u64,
}

impl Board {
    /// An Acorn module on the baseboard mini with the built-in pin table.
    pub fn acorn(variant: BoardVariant) -> Self {
        Self::with_resources(variant, PhysicalResourceMap::acorn_baseboard_mini(variant))
    }

    /// A board with a custom resource map.
    pub fn with_resources(variant: BoardVariant, resources: PhysicalResourceMap) -> Self {
        Self {
            variant,
            resources,
            integrated_main_ram_size: 0,
        }
    }

    /// Use on-chip block RAM as main memory instead of external SDRAM.
    pub fn with_integrated_main_ram(mut self, size_bytes: u64) -> Self {
        self.integrated_main_ram_size = size_bytes;
        self
    }

    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    pub fn info(&self) -> &'static VariantInfo {
        self.variant.info()
    }

    pub fn resources(&self) -> &PhysicalResourceMap {
        &self.resources
    }

    pub fn integrated_main_ram_size(&self) -> u64 {
        self.integrated_main_ram_size
    }

    /// Whether main memory is already supplied on-chip.
    pub fn has_integrated_main_ram(&self) -> bool {
        self.integrated_main_ram_size > 0
    }

    /// Whether the transceiver pin group is physically present.
    pub fn has_transceiver(&self) -> bool {
        self.resources.has_group("sfp")
    }

    /// The JTAG programmer for this board.
    pub fn create_programmer(&self) -> OpenOcd {
        OpenOcd::new(OPENOCD_CONFIG, self.info().flash_proxy)
    }
}
