//! SoC assembly.
//!
//! [`assemble`] wires an ordered intent list to a CRG and a board's pins.
//! The dependency gate runs before anything is instantiated, and the
//! result is only returned once every peripheral has been built, so callers
//! never see a partially assembled SoC.

use acorn_clock::domain::SYS;
use acorn_clock::{ClockResetGenerator, Frequency};
use acorn_platform::{Board, BoardVariant, ConstraintSet, PinGroup, ResourceClaims};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SocError;
use crate::gate::{check_order, gate_or_halt};
use crate::intent::{IntentKind, IntentParams, PeripheralIntent};
use crate::peripheral::{DramController, EthernetPhy, LedChaser, Peripheral, Uart};
use crate::transceiver::ACORN_QPLL;

/// Vivado downgrades this DRC so the fabric-routed GTP reference clock is accepted.
pub const GTP_REFCLK_DRC_WAIVER: &str = "set_property SEVERITY {Warning} [get_drc_checks REQP-49]";

/// The finished SoC description handed to the build pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledSoc {
    ident: String,
    variant: BoardVariant,
    device: String,
    /// `None` only for a SoC with no peripherals on a CRG without `sys`.
    sys_clk_freq: Option<Frequency>,
    crg: ClockResetGenerator,
    uart: Option<Uart>,
    peripherals: Vec<Peripheral>,
    constraints: ConstraintSet,
    /// Every pin group the SoC claimed, in claim order.
    pins: Vec<PinGroup>,
}

impl AssembledSoc {
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    /// FPGA part number.
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn sys_clk_freq(&self) -> Option<Frequency> {
        self.sys_clk_freq
    }

    pub fn crg(&self) -> &ClockResetGenerator {
        &self.crg
    }

    pub fn uart(&self) -> Option<&Uart> {
        self.uart.as_ref()
    }

    pub fn peripherals(&self) -> &[Peripheral] {
        &self.peripherals
    }

    pub fn peripheral(&self, kind: IntentKind) -> Option<&Peripheral> {
        self.peripherals.iter().find(|p| p.kind() == kind)
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn pins(&self) -> &[PinGroup] {
        &self.pins
    }
}

/// Assemble a SoC from a CRG and an ordered intent list.
///
/// `constraints` carries whatever the CRG registered; peripheral commands
/// are appended to it.
pub fn assemble(
    crg: ClockResetGenerator,
    intents: &[PeripheralIntent],
    board: &Board,
    mut constraints: ConstraintSet,
    ident: &str,
) -> Result<AssembledSoc, SocError> {
    check_order(intents)?;
    gate_or_halt(&crg, intents)?;

    // The gate guarantees `sys` for every intent; a bare UART-only SoC may lack it.
    let sys_clk_freq = crg.domain(SYS).map(|d| d.frequency);

    // Transceiver checks come before any pins are claimed.
    if intents.iter().any(|i| i.kind() == IntentKind::Network) {
        if !board.has_transceiver() {
            return Err(SocError::UnsupportedFeatureForVariant {
                feature: "network PHY".to_string(),
                variant: board.variant(),
            });
        }
        if let Some(refclk) = sys_clk_freq {
            ACORN_QPLL.check(refclk)?;
        }
    }

    let mut claims = ResourceClaims::new(board.resources());
    // The reference pair belongs to the CRG.
    claims.request(acorn_clock::crg::REFERENCE_GROUP, 0)?;

    let uart = if board.resources().has_group("serial") {
        Some(Uart::new(claims.request("serial", 0)?))
    } else {
        debug!("no serial group, SoC has no console UART");
        None
    };

    let mut peripherals = Vec::with_capacity(intents.len());
    for intent in intents {
        let peripheral = match intent.params() {
            IntentParams::Memory(params) => {
                let pads = claims.request("ddram", 0)?;
                let dram = DramController::new(pads, params, &crg).ok_or_else(|| {
                    SocError::UnsatisfiedClockDependency {
                        intent: IntentKind::Memory,
                        domain: SYS.to_string(),
                    }
                })?;
                Peripheral::Memory(dram)
            }
            IntentParams::Network(bridge) => {
                let pads = claims.request("sfp", 0)?;
                let phy = EthernetPhy::new(pads, bridge, &crg)?;
                constraints.add_command(GTP_REFCLK_DRC_WAIVER);
                Peripheral::Network(phy)
            }
            IntentParams::Status(params) => {
                let sys = sys_clk_freq.ok_or_else(|| SocError::UnsatisfiedClockDependency {
                    intent: IntentKind::Status,
                    domain: SYS.to_string(),
                })?;
                let pads = claims.request_all("user_led")?;
                Peripheral::Status(LedChaser::new(pads, params, sys))
            }
        };
        debug!(peripheral = %peripheral.kind(), "instantiated");
        peripherals.push(peripheral);
    }

    let soc = AssembledSoc {
        ident: ident.to_string(),
        variant: board.variant(),
        device: board.info().device.to_string(),
        sys_clk_freq,
        crg,
        uart,
        peripherals,
        constraints,
        pins: claims.into_claimed(),
    };
    info!(
        variant = %soc.variant,
        peripherals = soc.peripherals.len(),
        pins = soc.pins.len(),
        "SoC assembled"
    );
    Ok(soc)
}
