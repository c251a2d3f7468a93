//! Clock-synthesis primitive.
//!
//! The synthesizer is a black box to the rest of the crate: given a reference
//! frequency and a list of `(frequency, phase)` requests it either returns a
//! configuration that produces every request exactly or fails feasibility.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Phase;
use crate::error::ClockError;
use crate::frequency::Frequency;

/// One requested PLL output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockRequest {
    pub name: String,
    pub frequency: Frequency,
    pub phase: Phase,
}

impl ClockRequest {
    pub fn new(name: impl Into<String>, frequency: Frequency, phase: Phase) -> Self {
        Self {
            name: name.into(),
            frequency,
            phase,
        }
    }
}

/// A resolved PLL output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PllOutput {
    pub name: String,
    pub divide: u32,
    pub frequency: Frequency,
    pub phase: Phase,
}

/// A complete PLL configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PllConfig {
    /// Primitive name (e.g. "PLLE2_ADV").
    pub primitive: String,
    pub clkin: Frequency,
    pub divclk_divide: u32,
    pub clkfbout_mult: u32,
    /// VCO frequency, rounded down to whole hertz.
    pub vco: Frequency,
    pub outputs: Vec<PllOutput>,
}

/// Something that can realize a set of clock requests from one input.
pub trait ClockSynthesizer {
    /// Primitive name used in diagnostics.
    fn name(&self) -> &str;

    /// Find a configuration producing every request exactly.
    fn synthesize(&self, clkin: Frequency, requests: &[ClockRequest]) -> Result<PllConfig, ClockError>;
}

const NCLKOUTS_MAX: usize = 6;
const CLKIN_RANGE: (u64, u64) = (19_000_000, 800_000_000);
const DIVCLK_DIVIDE_RANGE: (u32, u32) = (1, 56);
const CLKFBOUT_MULT_RANGE: (u32, u32) = (2, 64);
const CLKOUT_DIVIDE_RANGE: (u32, u32) = (1, 128);

/// Xilinx 7-series PLLE2_ADV model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S7Pll {
    vco_range: (u64, u64),
}

impl S7Pll {
    /// PLL limits for a device speed grade.
    pub fn new(speed_grade: i8) -> Result<Self, ClockError> {
        let vco_range = match speed_grade {
            -1 => (800_000_000, 1_600_000_000),
            -2 => (800_000_000, 1_866_000_000),
            -3 => (800_000_000, 2_133_000_000),
            other => return Err(ClockError::UnknownSpeedGrade(other)),
        };
        Ok(Self { vco_range })
    }

    fn infeasible(&self, detail: String) -> ClockError {
        ClockError::Infeasible {
            primitive: self.name().to_string(),
            detail,
        }
    }
}

/// Output divider that hits `target` exactly from `clkin * mult / divclk`, if any.
fn exact_divide(vco_num: u64, divclk: u32, target: Frequency) -> Option<u32> {
    let den = target.hz().checked_mul(u64::from(divclk))?;
    if den == 0 || vco_num % den != 0 {
        return None;
    }
    let divide = u32::try_from(vco_num / den).ok()?;
    (CLKOUT_DIVIDE_RANGE.0..=CLKOUT_DIVIDE_RANGE.1)
        .contains(&divide)
        .then_some(divide)
}

/// Phase step of an output is one eighth of a VCO period, i.e. `45 / divide` degrees.
fn phase_realizable(phase: Phase, divide: u32) -> bool {
    (u32::from(phase.as_degrees()) * divide) % 45 == 0
}

impl ClockSynthesizer for S7Pll {
    fn name(&self) -> &str {
        "PLLE2_ADV"
    }

    fn synthesize(&self, clkin: Frequency, requests: &[ClockRequest]) -> Result<PllConfig, ClockError> {
        if requests.len() > NCLKOUTS_MAX {
            return Err(self.infeasible(format!(
                "{} outputs requested, at most {NCLKOUTS_MAX} available",
                requests.len()
            )));
        }
        if !(CLKIN_RANGE.0..=CLKIN_RANGE.1).contains(&clkin.hz()) {
            return Err(self.infeasible(format!(
                "input {clkin} outside {}..{}",
                Frequency::from_hz(CLKIN_RANGE.0),
                Frequency::from_hz(CLKIN_RANGE.1)
            )));
        }
        if let Some(zero) = requests.iter().find(|r| r.frequency.is_zero()) {
            return Err(ClockError::ZeroFrequency {
                name: zero.name.clone(),
            });
        }

        let mut phase_blocked = false;
        for divclk in DIVCLK_DIVIDE_RANGE.0..=DIVCLK_DIVIDE_RANGE.1 {
            for mult in (CLKFBOUT_MULT_RANGE.0..=CLKFBOUT_MULT_RANGE.1).rev() {
                let vco_num = clkin.hz() * u64::from(mult);
                let (vco_min, vco_max) = self.vco_range;
                if vco_num < vco_min * u64::from(divclk) || vco_num > vco_max * u64::from(divclk) {
                    continue;
                }

                let mut outputs = Vec::with_capacity(requests.len());
                for request in requests {
                    let Some(divide) = exact_divide(vco_num, divclk, request.frequency) else {
                        break;
                    };
                    if !phase_realizable(request.phase, divide) {
                        phase_blocked = true;
                        break;
                    }
                    outputs.push(PllOutput {
                        name: request.name.clone(),
                        divide,
                        frequency: request.frequency,
                        phase: request.phase,
                    });
                }

                if outputs.len() == requests.len() {
                    let vco = Frequency::from_hz(vco_num / u64::from(divclk));
                    debug!(%clkin, divclk, mult, %vco, "PLL configuration found");
                    return Ok(PllConfig {
                        primitive: self.name().to_string(),
                        clkin,
                        divclk_divide: divclk,
                        clkfbout_mult: mult,
                        vco,
                        outputs,
                    });
                }
            }
        }

        let wanted: Vec<String> = requests
            .iter()
            .map(|r| format!("{} {} @ {}", r.name, r.frequency, r.phase))
            .collect();
        let detail = if phase_blocked {
            format!(
                "frequencies reachable from {clkin} but phase not realizable: {}",
                wanted.join(", ")
            )
        } else {
            format!("no exact configuration from {clkin} for {}", wanted.join(", "))
        };
        Err(self.infeasible(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddr_requests(sys: Frequency) -> Vec<ClockRequest> {
        let sys4x = sys.checked_mul(4).unwrap();
        vec![
            ClockRequest::new("sys", sys, Phase::ZERO),
            ClockRequest::new("sys4x", sys4x, Phase::ZERO),
            ClockRequest::new("sys4x_dqs", sys4x, Phase::degrees(90)),
        ]
    }

    #[test]
    fn acorn_default_configuration() {
        let pll = S7Pll::new(-3).unwrap();
        let cfg = pll
            .synthesize(Frequency::from_mhz(200), &ddr_requests(Frequency::from_hz(156_250_000)))
            .unwrap();
        assert_eq!(cfg.divclk_divide, 4);
        assert_eq!(cfg.clkfbout_mult, 25);
        assert_eq!(cfg.vco, Frequency::from_mhz(1250));
        let divides: Vec<u32> = cfg.outputs.iter().map(|o| o.divide).collect();
        assert_eq!(divides, vec![8, 2, 2]);
    }

    #[test]
    fn every_output_is_exact() {
        let pll = S7Pll::new(-1).unwrap();
        let clkin = Frequency::from_mhz(200);
        let cfg = pll
            .synthesize(clkin, &ddr_requests(Frequency::from_mhz(100)))
            .unwrap();
        for out in &cfg.outputs {
            assert_eq!(
                clkin.hz() * u64::from(cfg.clkfbout_mult),
                out.frequency.hz() * u64::from(cfg.divclk_divide) * u64::from(out.divide)
            );
        }
    }

    #[test]
    fn unreachable_frequency_is_infeasible() {
        let pll = S7Pll::new(-2).unwrap();
        let err = pll
            .synthesize(
                Frequency::from_mhz(200),
                &[ClockRequest::new("sys", Frequency::from_hz(123_456_789), Phase::ZERO)],
            )
            .unwrap_err();
        assert!(matches!(err, ClockError::Infeasible { .. }));
    }

    #[test]
    fn unrealizable_phase_is_reported() {
        let pll = S7Pll::new(-2).unwrap();
        // 800 MHz only comes out with divide 1 or 2; 10 degrees is not a multiple of 22.5.
        let err = pll
            .synthesize(
                Frequency::from_mhz(200),
                &[ClockRequest::new("fast", Frequency::from_mhz(800), Phase::degrees(10))],
            )
            .unwrap_err();
        assert!(err.to_string().contains("phase not realizable"));
    }

    #[test]
    fn too_many_outputs() {
        let pll = S7Pll::new(-1).unwrap();
        let requests: Vec<_> = (0..7)
            .map(|i| ClockRequest::new(format!("c{i}"), Frequency::from_mhz(100), Phase::ZERO))
            .collect();
        assert!(pll.synthesize(Frequency::from_mhz(200), &requests).is_err());
    }

    #[test]
    fn input_out_of_range() {
        let pll = S7Pll::new(-1).unwrap();
        let err = pll
            .synthesize(
                Frequency::from_mhz(10),
                &[ClockRequest::new("sys", Frequency::from_mhz(50), Phase::ZERO)],
            )
            .unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn zero_request_rejected() {
        let pll = S7Pll::new(-1).unwrap();
        let err = pll
            .synthesize(
                Frequency::from_mhz(200),
                &[ClockRequest::new("sys", Frequency::from_hz(0), Phase::ZERO)],
            )
            .unwrap_err();
        assert!(matches!(err, ClockError::ZeroFrequency { .. }));
    }

    #[test]
    fn unknown_speed_grade() {
        assert!(matches!(S7Pll::new(-4), Err(ClockError::UnknownSpeedGrade(-4))));
    }
}
