//! Physical resource map: named pin groups on the board.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};
use crate::variant::BoardVariant;

/// One named signal inside a pin group (e.g. the `p` leg of a differential clock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subsignal {
    /// Signal name within the group.
    pub name: String,
    /// Package pins, LSB first.
    pub pins: Vec<String>,
    /// I/O standard override for this signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_standard: Option<String>,
}

impl Subsignal {
    pub fn new(name: impl Into<String>, pins: &str) -> Self {
        Self {
            name: name.into(),
            pins: pins.split_whitespace().map(str::to_string).collect(),
            io_standard: None,
        }
    }

    pub fn with_io_standard(mut self, standard: impl Into<String>) -> Self {
        self.io_standard = Some(standard.into());
        self
    }
}

/// A named, indexed group of package pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PinGroup {
    /// Group name (e.g. "clk200", "user_led").
    pub name: String,
    /// Index among groups of the same name.
    #[serde(default)]
    pub index: u32,
    /// Pins for single-signal groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pins: Vec<String>,
    /// Named subsignals for multi-signal groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "subsignal")]
    pub subsignals: Vec<Subsignal>,
    /// Default I/O standard for the whole group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_standard: Option<String>,
}

impl PinGroup {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
            pins: Vec::new(),
            subsignals: Vec::new(),
            io_standard: None,
        }
    }

    pub fn with_pins(mut self, pins: &str) -> Self {
        self.pins = pins.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn with_subsignal(mut self, subsignal: Subsignal) -> Self {
        self.subsignals.push(subsignal);
        self
    }

    pub fn with_io_standard(mut self, standard: impl Into<String>) -> Self {
        self.io_standard = Some(standard.into());
        self
    }

    /// Look up a subsignal by name.
    pub fn subsignal(&self, name: &str) -> Option<&Subsignal> {
        self.subsignals.iter().find(|s| s.name == name)
    }

    /// Every package pin used by this group.
    pub fn all_pins(&self) -> impl Iterator<Item = &str> {
        self.pins
            .iter()
            .chain(self.subsignals.iter().flat_map(|s| s.pins.iter()))
            .map(String::as_str)
    }

    /// Whether the group is a differential pair (`p`/`n` subsignals).
    pub fn is_differential(&self) -> bool {
        self.subsignal("p").is_some() && self.subsignal("n").is_some()
    }
}

/// Board-specific table of pin groups. Read-only to the SoC core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalResourceMap {
    groups: Vec<PinGroup>,
}

impl PhysicalResourceMap {
    /// Build a map, rejecting duplicate `(name, index)` keys.
    pub fn from_groups(groups: Vec<PinGroup>) -> Result<Self> {
        let mut map = Self::default();
        map.add_extension(groups, false)?;
        Ok(map)
    }

    /// Add groups to the map. Prepended groups win name lookups for `request_all` ordering.
    pub fn add_extension(&mut self, groups: Vec<PinGroup>, prepend: bool) -> Result<()> {
        for group in &groups {
            let clash = self.lookup(&group.name, group.index).is_some()
                || groups
                    .iter()
                    .filter(|g| g.name == group.name && g.index == group.index)
                    .count()
                    > 1;
            if clash {
                return Err(PlatformError::DuplicateResource {
                    name: group.name.clone(),
                    index: group.index,
                });
            }
        }
        if prepend {
            self.groups.splice(0..0, groups);
        } else {
            self.groups.extend(groups);
        }
        Ok(())
    }

    /// Look up a pin group by name and index.
    pub fn lookup(&self, name: &str, index: u32) -> Option<&PinGroup> {
        self.groups
            .iter()
            .find(|g| g.name == name && g.index == index)
    }

    /// Whether any group with this name exists.
    pub fn has_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    /// All groups with this name, ordered by index.
    pub fn all_named(&self, name: &str) -> Vec<&PinGroup> {
        let mut found: Vec<_> = self.groups.iter().filter(|g| g.name == name).collect();
        found.sort_by_key(|g| g.index);
        found
    }

    pub fn groups(&self) -> &[PinGroup] {
        &self.groups
    }

    /// Pin table of the Acorn module on the LiteX Acorn Baseboard Mini.
    ///
    /// The `sfp` group is only present on variants whose transceiver quad
    /// reaches the baseboard cage.
    pub fn acorn_baseboard_mini(variant: BoardVariant) -> Self {
        let mut groups = vec![
            // Console on the M.2 sideband pins.
            PinGroup::new("serial", 0)
                .with_subsignal(Subsignal::new("tx", "G1").with_io_standard("LVCMOS33"))
                .with_subsignal(Subsignal::new("rx", "Y13").with_io_standard("LVCMOS18")),
            PinGroup::new("clk200", 0)
                .with_subsignal(Subsignal::new("p", "J19"))
                .with_subsignal(Subsignal::new("n", "H19"))
                .with_io_standard("DIFF_SSTL15"),
        ];
        for (index, pin) in ["G3", "H3", "G4", "H4"].into_iter().enumerate() {
            groups.push(
                PinGroup::new("user_led", index as u32)
                    .with_pins(pin)
                    .with_io_standard("LVCMOS15"),
            );
        }
        groups.push(
            PinGroup::new("ddram", 0)
                .with_subsignal(Subsignal::new(
                    "a",
                    "M15 L21 M16 L18 K21 M18 M21 N20 M20 N19 J21 M22 K22 N18 N22 J22",
                ))
                .with_subsignal(Subsignal::new("ba", "L19 J20 L20"))
                .with_subsignal(Subsignal::new("ras_n", "H20"))
                .with_subsignal(Subsignal::new("cas_n", "K18"))
                .with_subsignal(Subsignal::new("we_n", "L16"))
                .with_subsignal(Subsignal::new("dm", "A19 G22"))
                .with_subsignal(Subsignal::new(
                    "dq",
                    "D19 B20 E19 A20 F19 C19 F20 C18 E22 G21 E21 D21 F22 D22 B22 C22",
                ))
                .with_subsignal(Subsignal::new("dqs_p", "F18 B21").with_io_standard("DIFF_SSTL15"))
                .with_subsignal(Subsignal::new("dqs_n", "E18 A21").with_io_standard("DIFF_SSTL15"))
                .with_subsignal(Subsignal::new("clk_p", "K17").with_io_standard("DIFF_SSTL15"))
                .with_subsignal(Subsignal::new("clk_n", "J17").with_io_standard("DIFF_SSTL15"))
                .with_subsignal(Subsignal::new("cke", "H22"))
                .with_subsignal(Subsignal::new("odt", "K19"))
                .with_subsignal(Subsignal::new("reset_n", "F21"))
                .with_io_standard("SSTL15"),
        );
        if variant.info().has_transceiver {
            groups.push(
                PinGroup::new("sfp", 0)
                    .with_subsignal(Subsignal::new("txp", "D5"))
                    .with_subsignal(Subsignal::new("txn", "C5"))
                    .with_subsignal(Subsignal::new("rxp", "D11"))
                    .with_subsignal(Subsignal::new("rxn", "C11")),
            );
        }
        Self { groups }
    }
}

/// Tracks which pin groups one assembly run has taken from a resource map.
#[derive(Debug)]
pub struct ResourceClaims<'a> {
    map: &'a PhysicalResourceMap,
    claimed: BTreeSet<(String, u32)>,
    order: Vec<PinGroup>,
}

impl<'a> ResourceClaims<'a> {
    pub fn new(map: &'a PhysicalResourceMap) -> Self {
        Self {
            map,
            claimed: BTreeSet::new(),
            order: Vec::new(),
        }
    }

    /// Claim one pin group.
    pub fn request(&mut self, name: &str, index: u32) -> Result<PinGroup> {
        let group = self
            .map
            .lookup(name, index)
            .ok_or_else(|| PlatformError::MissingResource {
                name: name.to_string(),
                index: Some(index),
            })?;
        if !self.claimed.insert((name.to_string(), index)) {
            return Err(PlatformError::ResourceAlreadyClaimed {
                name: name.to_string(),
                index,
            });
        }
        self.order.push(group.clone());
        Ok(group.clone())
    }

    /// Claim every group with this name. At least one must exist.
    pub fn request_all(&mut self, name: &str) -> Result<Vec<PinGroup>> {
        let indices: Vec<u32> = self.map.all_named(name).iter().map(|g| g.index).collect();
        if indices.is_empty() {
            return Err(PlatformError::MissingResource {
                name: name.to_string(),
                index: None,
            });
        }
        indices
            .into_iter()
            .map(|index| self.request(name, index))
            .collect()
    }

    /// Claimed groups, in claim order.
    pub fn into_claimed(self) -> Vec<PinGroup> {
        self.order
    }
}
