//! `acorn.toml` manifest parsing and project defaults.

use std::path::{Path, PathBuf};

use acorn_clock::Frequency;
use acorn_platform::BoardVariant;
use acorn_soc::config::{DEFAULT_L2_CACHE_SIZE, DEFAULT_SYS_CLK_FREQ};
use acorn_soc::{EthernetConfig, FeatureConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const MANIFEST_NAME: &str = "acorn.toml";

/// The top-level manifest structure for an Acorn project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcornManifest {
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub features: FeatureSection,
    #[serde(default)]
    pub ethernet: EthernetConfig,
    #[serde(default)]
    pub build: BuildSection,
}

/// Which board to target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardSection {
    #[serde(default)]
    pub variant: Option<BoardVariant>,
    /// Custom `.board.toml`, relative to the manifest directory.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub integrated_main_ram_size: Option<u64>,
}

/// Feature toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureSection {
    /// System clock in Hz; fractional notation such as `156.25e6` is accepted.
    #[serde(default = "default_sys_clk_freq")]
    pub sys_clk_freq: f64,
    #[serde(default = "default_true")]
    pub with_memory: bool,
    #[serde(default = "default_true")]
    pub with_led_chaser: bool,
    #[serde(default = "default_l2_cache_size")]
    pub l2_cache_size: u64,
    #[serde(default)]
    pub ident: Option<String>,
}

fn default_sys_clk_freq() -> f64 {
    DEFAULT_SYS_CLK_FREQ.hz() as f64
}

fn default_true() -> bool {
    true
}

fn default_l2_cache_size() -> u64 {
    DEFAULT_L2_CACHE_SIZE
}

impl Default for FeatureSection {
    fn default() -> Self {
        Self {
            sys_clk_freq: default_sys_clk_freq(),
            with_memory: true,
            with_led_chaser: true,
            l2_cache_size: DEFAULT_L2_CACHE_SIZE,
            ident: None,
        }
    }
}

/// Build output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSection {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Artifact base name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub flash_offset: Option<u32>,
}

/// Convert a frequency in Hz given as a float.
pub fn frequency_from_hz(hz: f64) -> Result<Frequency> {
    Frequency::from_hz_f64(hz)
        .ok_or_else(|| anyhow!("system clock frequency must be a positive whole number of Hz, got {hz}"))
}

impl AcornManifest {
    /// Search upward from `start_dir` for an `acorn.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_NAME);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: AcornManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing acorn.toml")
    }

    /// Feature configuration described by the manifest alone.
    pub fn feature_config(&self) -> Result<FeatureConfig> {
        Ok(FeatureConfig {
            variant: self.board.variant.unwrap_or_default(),
            sys_clk_freq: frequency_from_hz(self.features.sys_clk_freq)?,
            with_memory: self.features.with_memory,
            ethernet: self.ethernet.clone(),
            with_led_chaser: self.features.with_led_chaser,
            l2_cache_size: self.features.l2_cache_size,
            ident: self.features.ident.clone(),
        })
    }

    /// Generate the default template for `acorn init`.
    pub fn template(variant: BoardVariant) -> String {
        format!(
            r#"[board]
variant = "{variant}"

[features]
sys-clk-freq = 156.25e6
with-memory = true
with-led-chaser = true

[ethernet]
mode = "none"
local-ip = "192.168.1.50"

[build]
output-dir = "build"
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acorn_soc::{EthernetAddressing, EthernetMode};

    #[test]
    fn parse_full_manifest() {
        let toml_str = r#"
[board]
variant = "cle-101"
integrated-main-ram-size = 65536

[features]
sys-clk-freq = 100e6
with-memory = false
with-led-chaser = false
l2-cache-size = 4096
ident = "bench rig"

[ethernet]
mode = "ethernet"
addressing = "dynamic-ip"
local-ip = "10.0.0.2"
remote-ip = "10.0.0.1"

[build]
output-dir = "out"
name = "rig"
flash-offset = 4194304
"#;
        let manifest = AcornManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.board.variant, Some(BoardVariant::Cle101));
        assert_eq!(manifest.board.integrated_main_ram_size, Some(65536));
        assert_eq!(manifest.build.flash_offset, Some(0x40_0000));

        let config = manifest.feature_config().unwrap();
        assert_eq!(config.variant, BoardVariant::Cle101);
        assert_eq!(config.sys_clk_freq, Frequency::from_mhz(100));
        assert!(!config.with_memory);
        assert!(!config.with_led_chaser);
        assert_eq!(config.l2_cache_size, 4096);
        assert_eq!(config.ident(), "bench rig");
        assert_eq!(config.ethernet.mode, EthernetMode::Ethernet);
        assert_eq!(config.ethernet.addressing, EthernetAddressing::DynamicIp);
        assert_eq!(config.ethernet.remote_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = AcornManifest::from_str("").unwrap();
        assert_eq!(manifest.feature_config().unwrap(), FeatureConfig::default());
    }

    #[test]
    fn fractional_hz_rejected() {
        let manifest = AcornManifest::from_str("[features]\nsys-clk-freq = 100.5\n").unwrap();
        assert!(manifest.feature_config().is_err());
    }

    #[test]
    fn template_round_trips() {
        let manifest = AcornManifest::from_str(&AcornManifest::template(BoardVariant::Cle215)).unwrap();
        let config = manifest.feature_config().unwrap();
        assert_eq!(config.variant, BoardVariant::Cle215);
        assert_eq!(config.sys_clk_freq, DEFAULT_SYS_CLK_FREQ);
    }

    #[test]
    fn find_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), "[board]\nvariant = \"cle-215\"\n").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        let (manifest, found) = AcornManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(found, dir.path());
        assert_eq!(manifest.board.variant, Some(BoardVariant::Cle215));
    }
}
