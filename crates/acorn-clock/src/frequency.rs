//! Exact frequency arithmetic.
//!
//! Frequencies are whole hertz so that derived clocks can be compared for
//! exact equality; a plan with drift between domains is rejected rather than
//! rounded.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A clock frequency in hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frequency(u64);

impl Frequency {
    pub const fn from_hz(hz: u64) -> Self {
        Self(hz)
    }

    pub const fn from_mhz(mhz: u64) -> Self {
        Self(mhz * 1_000_000)
    }

    /// Convert a floating-point value in hertz (e.g. `156.25e6`).
    ///
    /// Returns `None` unless the value is finite, positive and a whole number of hertz.
    pub fn from_hz_f64(hz: f64) -> Option<Self> {
        if !hz.is_finite() || hz <= 0.0 || hz.fract() != 0.0 || hz > u64::MAX as f64 {
            return None;
        }
        Some(Self(hz as u64))
    }

    pub const fn hz(self) -> u64 {
        self.0
    }

    pub fn as_mhz(self) -> f64 {
        self.0 as f64 / 1e6
    }

    pub fn period_ns(self) -> f64 {
        1e9 / self.0 as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_mul(self, factor: u64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// This frequency as a reduced fraction of `reference`.
    pub fn ratio_to(self, reference: Frequency) -> Ratio {
        Ratio::new(self.0, reference.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MHz", self.as_mhz())
    }
}

/// A reduced fraction `num / den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    /// Build a reduced ratio. A zero denominator yields `0/1`.
    pub fn new(num: u64, den: u64) -> Self {
        if den == 0 {
            return Self { num: 0, den: 1 };
        }
        let g = gcd(num, den);
        Self {
            num: num / g,
            den: den / g,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}
