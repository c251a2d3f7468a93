//! Feature configuration for one SoC build.

use acorn_clock::Frequency;
use acorn_platform::variant::DEFAULT_IDENT;
use acorn_platform::BoardVariant;
use serde::{Deserialize, Serialize};

/// Default static IP for Ethernet and Etherbone.
pub const DEFAULT_ETH_IP: &str = "192.168.1.50";

/// Default system clock: 156.25 MHz, which also clocks the 1000BASE-X QPLL.
pub const DEFAULT_SYS_CLK_FREQ: Frequency = Frequency::from_hz(156_250_000);

/// Default L2 cache in front of the SDRAM controller.
pub const DEFAULT_L2_CACHE_SIZE: u64 = 8192;

/// Which protocol, if any, sits on top of the transceiver PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EthernetMode {
    #[default]
    None,
    /// CPU-visible Ethernet MAC.
    Ethernet,
    /// Wishbone-over-UDP bridge.
    Etherbone,
}

impl EthernetMode {
    pub fn is_enabled(self) -> bool {
        self != EthernetMode::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EthernetMode::None => "none",
            EthernetMode::Ethernet => "ethernet",
            EthernetMode::Etherbone => "etherbone",
        }
    }
}

/// How the Ethernet MAC gets its IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EthernetAddressing {
    #[default]
    StaticIp,
    /// Software may change the address at runtime; `local_ip` is the reset value.
    DynamicIp,
}

/// Network options. Addresses are kept as text until selection validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EthernetConfig {
    #[serde(default)]
    pub mode: EthernetMode,
    #[serde(default)]
    pub addressing: EthernetAddressing,
    #[serde(default = "default_eth_ip")]
    pub local_ip: String,
    /// TFTP server the boot ROM fetches from.
    #[serde(default)]
    pub remote_ip: Option<String>,
}

fn default_eth_ip() -> String {
    DEFAULT_ETH_IP.to_string()
}

impl Default for EthernetConfig {
    fn default() -> Self {
        Self {
            mode: EthernetMode::None,
            addressing: EthernetAddressing::StaticIp,
            local_ip: default_eth_ip(),
            remote_ip: None,
        }
    }
}

/// Everything the core needs to know about what to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureConfig {
    pub variant: BoardVariant,
    pub sys_clk_freq: Frequency,
    /// Set to false to suppress external memory even when the board has it.
    pub with_memory: bool,
    pub ethernet: EthernetConfig,
    pub with_led_chaser: bool,
    pub l2_cache_size: u64,
    /// Identification string override.
    pub ident: Option<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            variant: BoardVariant::default(),
            sys_clk_freq: DEFAULT_SYS_CLK_FREQ,
            with_memory: true,
            ethernet: EthernetConfig::default(),
            with_led_chaser: true,
            l2_cache_size: DEFAULT_L2_CACHE_SIZE,
            ident: None,
        }
    }
}

impl FeatureConfig {
    /// Identification string embedded in the SoC.
    pub fn ident(&self) -> &str {
        self.ident.as_deref().unwrap_or(DEFAULT_IDENT)
    }
}
