//! Board variant table.
//!
//! The Acorn module ships in a small, closed set of sub-revisions. Everything
//! that differs between them lives in one row of [`VARIANTS`]; callers dispatch
//! through [`BoardVariant::info`] rather than matching on the variant themselves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// A board sub-revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum BoardVariant {
    #[default]
    #[serde(rename = "cle-215+")]
    Cle215Plus,
    #[serde(rename = "cle-215")]
    Cle215,
    #[serde(rename = "cle-101")]
    Cle101,
}

/// Static capabilities of one board variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantInfo {
    /// The variant this row describes.
    pub variant: BoardVariant,
    /// Canonical name (as accepted on the command line).
    pub name: &'static str,
    /// FPGA part number.
    pub device: &'static str,
    /// Device speed grade (-1, -2 or -3).
    pub speed_grade: i8,
    /// Whether the GTP quad driving the baseboard SFP cage is bonded out.
    pub has_transceiver: bool,
    /// Whether the `sys` -> reference false path must be registered.
    pub reset_false_path: bool,
    /// JTAG-SPI proxy bitstream used for flashing.
    pub flash_proxy: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

/// Variant lookup table, indexed by [`BoardVariant`] discriminant.
pub const VARIANTS: [VariantInfo; 3] = [
    VariantInfo {
        variant: BoardVariant::Cle215Plus,
        name: "cle-215+",
        device: "xc7a200t-fbg484-3",
        speed_grade: -3,
        has_transceiver: true,
        reset_false_path: true,
        flash_proxy: "bscan_spi_xc7a200t.bit",
        description: "Acorn CLE-215+ (XC7A200T, speed grade -3)",
    },
    VariantInfo {
        variant: BoardVariant::Cle215,
        name: "cle-215",
        device: "xc7a200t-fbg484-2",
        speed_grade: -2,
        has_transceiver: true,
        reset_false_path: true,
        flash_proxy: "bscan_spi_xc7a200t.bit",
        description: "Acorn CLE-215 (XC7A200T, speed grade -2)",
    },
    VariantInfo {
        variant: BoardVariant::Cle101,
        name: "cle-101",
        device: "xc7a100t-fbg484-2",
        speed_grade: -2,
        has_transceiver: false,
        reset_false_path: true,
        flash_proxy: "bscan_spi_xc7a100t.bit",
        description: "Acorn CLE-101 (XC7A100T, speed grade -2, no SFP lane)",
    },
];

/// Identification string embedded in every SoC built for this board family.
pub const DEFAULT_IDENT: &str = "Acorn SoC on CLE-101/215(+)";

impl BoardVariant {
    /// All variants, in table order.
    pub const ALL: [BoardVariant; 3] = [
        BoardVariant::Cle215Plus,
        BoardVariant::Cle215,
        BoardVariant::Cle101,
    ];

    /// Look up this variant's row in the board table.
    pub fn info(self) -> &'static VariantInfo {
        &VARIANTS[self as usize]
    }

    /// Canonical variant name.
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl fmt::Display for BoardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoardVariant {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VARIANTS
            .iter()
            .find(|row| row.name == wanted)
            .map(|row| row.variant)
            .ok_or_else(|| PlatformError::UnknownVariant { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_discriminant() {
        for variant in BoardVariant::ALL {
            assert_eq!(variant.info().variant, variant);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("CLE-215+".parse::<BoardVariant>().unwrap(), BoardVariant::Cle215Plus);
        assert_eq!(" cle-101 ".parse::<BoardVariant>().unwrap(), BoardVariant::Cle101);
    }

    #[test]
    fn parse_unknown_variant() {
        let err = "cle-301".parse::<BoardVariant>().unwrap_err();
        assert!(matches!(err, PlatformError::UnknownVariant { ref name } if name == "cle-301"));
    }

    #[test]
    fn only_cle101_lacks_transceiver() {
        let without: Vec<_> = BoardVariant::ALL
            .iter()
            .filter(|v| !v.info().has_transceiver)
            .collect();
        assert_eq!(without, vec![&BoardVariant::Cle101]);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for variant in BoardVariant::ALL {
            assert_eq!(variant.to_string().parse::<BoardVariant>().unwrap(), variant);
        }
    }
}
