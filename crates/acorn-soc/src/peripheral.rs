//! Instantiated peripherals.
//!
//! Each constructor takes the pin groups it was granted and the CRG it is
//! wired to. Constructors do no resource claiming of their own.

use acorn_clock::domain::{IDELAY, SYS};
use acorn_clock::{ClockError, ClockResetGenerator, Frequency};
use acorn_platform::PinGroup;
use serde::Serialize;

use crate::intent::{IntentKind, MemoryParams, NetworkBridge, StatusParams};
use crate::transceiver::{QpllSettings, ACORN_QPLL};

pub const UART_BAUDRATE: u32 = 115_200;

/// Serial console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uart {
    pub pads: PinGroup,
    pub baudrate: u32,
}

impl Uart {
    pub fn new(pads: PinGroup) -> Self {
        Self {
            pads,
            baudrate: UART_BAUDRATE,
        }
    }
}

/// DDR3 PHY plus controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DramController {
    pub pads: PinGroup,
    pub module: String,
    pub memtype: String,
    pub nphases: u32,
    pub rate: String,
    pub l2_cache_size: u64,
    pub sys_clk_freq: Frequency,
    /// IDELAYCTRL reference frequency seen by the PHY.
    pub iodelay_clk_freq: Frequency,
}

impl DramController {
    pub fn new(pads: PinGroup, params: &MemoryParams, crg: &ClockResetGenerator) -> Option<Self> {
        Some(Self {
            pads,
            module: params.module.clone(),
            memtype: params.memtype.clone(),
            nphases: params.nphases,
            rate: params.rate.clone(),
            l2_cache_size: params.l2_cache_size,
            sys_clk_freq: crg.domain(SYS)?.frequency,
            iodelay_clk_freq: crg.domain(IDELAY)?.frequency,
        })
    }
}

/// 1000BASE-X PHY on the SFP cage, with either a MAC or an Etherbone bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthernetPhy {
    pub pads: PinGroup,
    /// PHY implementation.
    pub kind: String,
    pub qpll: QpllSettings,
    /// Domain feeding the QPLL reference.
    pub refclk_domain: String,
    /// Line rate in bits per second.
    pub line_rate: u64,
    pub rx_polarity: u8,
    pub tx_polarity: u8,
    pub bridge: NetworkBridge,
}

impl EthernetPhy {
    pub fn new(
        pads: PinGroup,
        bridge: &NetworkBridge,
        crg: &ClockResetGenerator,
    ) -> Result<Self, ClockError> {
        let refclk = crg
            .domain(SYS)
            .map(|d| d.frequency)
            .ok_or_else(|| ClockError::Infeasible {
                primitive: "GTPE2_COMMON QPLL".to_string(),
                detail: format!("no {SYS} domain to feed the reference"),
            })?;
        let line_rate = ACORN_QPLL.check(refclk)?;
        Ok(Self {
            pads,
            kind: "A7_1000BASEX".to_string(),
            qpll: ACORN_QPLL,
            refclk_domain: SYS.to_string(),
            line_rate,
            // RX pair is swapped on the baseboard.
            rx_polarity: 1,
            tx_polarity: 0,
            bridge: bridge.clone(),
        })
    }
}

/// Walking-light pattern over the user LEDs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedChaser {
    pub pads: Vec<PinGroup>,
    pub period_ms: u64,
    /// `sys` cycles each LED stays lit for one half of the sweep.
    pub step_cycles: u64,
}

impl LedChaser {
    pub fn new(pads: Vec<PinGroup>, params: &StatusParams, sys_clk_freq: Frequency) -> Self {
        let n = (pads.len() as u64).max(1);
        let step_cycles = params.period_ms.saturating_mul(sys_clk_freq.hz()) / (1000 * 2 * n);
        Self {
            pads,
            period_ms: params.period_ms,
            step_cycles,
        }
    }
}

/// A peripheral attached to the SoC bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Peripheral {
    Memory(DramController),
    Network(EthernetPhy),
    Status(LedChaser),
}

impl Peripheral {
    pub fn kind(&self) -> IntentKind {
        match self {
            Peripheral::Memory(_) => IntentKind::Memory,
            Peripheral::Network(_) => IntentKind::Network,
            Peripheral::Status(_) => IntentKind::Status,
        }
    }
}
