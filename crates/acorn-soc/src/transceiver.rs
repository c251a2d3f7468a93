//! GTP transceiver reference PLL.
//!
//! The 1000BASE-X PHY runs its QPLL from the `sys` clock routed through the
//! fabric, so the line rate is a fixed multiple of `sys`.

use acorn_clock::{ClockError, Frequency};
use serde::Serialize;

const PRIMITIVE: &str = "GTPE2_COMMON QPLL";
const QPLL_VCO_RANGE: (u64, u64) = (1_600_000_000, 3_300_000_000);
/// 1000BASE-X line rate: 1.25 Gb/s (8b/10b encoded gigabit).
const LINE_RATE_BPS: u64 = 1_250_000_000;
/// GTP output divider used for 1000BASE-X.
const TX_RX_DIVIDER: u64 = 4;

/// QPLL attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QpllSettings {
    /// Reference clock select: 0b001 is the fabric-routed GTGREFCLK.
    pub refclksel: u8,
    pub fbdiv: u32,
    pub fbdiv_45: u32,
    pub refclk_div: u32,
}

pub(crate) const ACORN_QPLL: QpllSettings = QpllSettings {
    refclksel: 0b001,
    fbdiv: 4,
    fbdiv_45: 4,
    refclk_div: 1,
};

impl QpllSettings {
    /// VCO frequency for a given reference.
    pub fn vco(&self, refclk: Frequency) -> Option<Frequency> {
        let mult = u64::from(self.fbdiv) * u64::from(self.fbdiv_45);
        let div = u64::from(self.refclk_div).max(1);
        refclk
            .hz()
            .checked_mul(mult)
            .map(|hz| Frequency::from_hz(hz / div))
    }

    /// Serial line rate in bits per second (both clock edges, then the output divider).
    pub fn line_rate(&self, refclk: Frequency) -> Option<u64> {
        self.vco(refclk).map(|vco| vco.hz() * 2 / TX_RX_DIVIDER)
    }

    /// Check this configuration produces the 1000BASE-X line rate from `refclk`.
    pub fn check(&self, refclk: Frequency) -> Result<u64, ClockError> {
        let infeasible = |detail: String| ClockError::Infeasible {
            primitive: PRIMITIVE.to_string(),
            detail,
        };
        let overflow = || infeasible(format!("reference {refclk} overflows the VCO"));
        let vco = self.vco(refclk).ok_or_else(overflow)?;
        if vco.hz() < QPLL_VCO_RANGE.0 || vco.hz() > QPLL_VCO_RANGE.1 {
            return Err(infeasible(format!(
                "VCO {vco} from reference {refclk} is outside {} - {}",
                Frequency::from_hz(QPLL_VCO_RANGE.0),
                Frequency::from_hz(QPLL_VCO_RANGE.1)
            )));
        }
        let rate = self.line_rate(refclk).ok_or_else(overflow)?;
        if rate != LINE_RATE_BPS {
            return Err(infeasible(format!(
                "line rate {rate} b/s from reference {refclk}, 1000BASE-X needs {LINE_RATE_BPS} b/s"
            )));
        }
        Ok(rate)
    }
}
