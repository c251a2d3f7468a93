//! Peripheral instantiation intents.
//!
//! An intent is created once per assembly run by the selector and never
//! changes afterwards. It names the clock domains the peripheral will be
//! wired to; the assembler must find every one of them in the clock plan.

use std::fmt;
use std::net::Ipv4Addr;

use acorn_clock::domain::{IDELAY, SYS, SYS4X, SYS4X_DQS};
use serde::{Deserialize, Serialize};

/// Peripheral category. The ordering is the instantiation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentKind {
    Memory,
    Network,
    Status,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntentKind::Memory => "memory",
            IntentKind::Network => "network",
            IntentKind::Status => "status",
        })
    }
}

/// DDR3 controller parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryParams {
    /// SDRAM part (timing table lives in the controller library).
    pub module: String,
    pub memtype: String,
    pub nphases: u32,
    /// Controller:DRAM clock ratio.
    pub rate: String,
    pub l2_cache_size: u64,
}

/// Protocol attached to the transceiver PHY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NetworkBridge {
    Ethernet {
        local_ip: Ipv4Addr,
        remote_ip: Option<Ipv4Addr>,
        dynamic_ip: bool,
    },
    Etherbone {
        ip: Ipv4Addr,
    },
}

/// LED chaser parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusParams {
    /// Full sweep period.
    pub period_ms: u64,
}

/// Kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentParams {
    Memory(MemoryParams),
    Network(NetworkBridge),
    Status(StatusParams),
}

/// A decision to instantiate one peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralIntent {
    required_domains: Vec<String>,
    params: IntentParams,
}

impl PeripheralIntent {
    /// DDR3 memory: the PHY needs the 4x clocks and the IDELAYCTRL reference.
    pub fn memory(params: MemoryParams) -> Self {
        Self {
            required_domains: [SYS, SYS4X, SYS4X_DQS, IDELAY].map(String::from).to_vec(),
            params: IntentParams::Memory(params),
        }
    }

    /// Network PHY: the QPLL reference comes from `sys`.
    pub fn network(bridge: NetworkBridge) -> Self {
        Self {
            required_domains: vec![SYS.to_string()],
            params: IntentParams::Network(bridge),
        }
    }

    pub fn status(params: StatusParams) -> Self {
        Self {
            required_domains: vec![SYS.to_string()],
            params: IntentParams::Status(params),
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self.params {
            IntentParams::Memory(_) => IntentKind::Memory,
            IntentParams::Network(_) => IntentKind::Network,
            IntentParams::Status(_) => IntentKind::Status,
        }
    }

    pub fn required_domains(&self) -> &[String] {
        &self.required_domains
    }

    pub fn params(&self) -> &IntentParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_order_by_instantiation_priority() {
        assert!(IntentKind::Memory < IntentKind::Network);
        assert!(IntentKind::Network < IntentKind::Status);
    }

    #[test]
    fn memory_requires_ddr_domains() {
        let intent = PeripheralIntent::memory(MemoryParams {
            module: "MT41K512M16".into(),
            memtype: "DDR3".into(),
            nphases: 4,
            rate: "1:4".into(),
            l2_cache_size: 8192,
        });
        assert_eq!(intent.kind(), IntentKind::Memory);
        assert_eq!(intent.required_domains(), ["sys", "sys4x", "sys4x_dqs", "idelay"]);
    }

    #[test]
    fn network_requires_sys() {
        let intent = PeripheralIntent::network(NetworkBridge::Etherbone {
            ip: Ipv4Addr::new(192, 168, 1, 50),
        });
        assert_eq!(intent.kind(), IntentKind::Network);
        assert_eq!(intent.required_domains(), ["sys"]);
    }
}
