use core::fmt;

use crate::encoding::format;

wire_enum! {
    /// Laser behaviour while the mirror moves between wave numbers.
    pub enum LaserTransition {
        LaserOn => "LaserOn",
        LaserOff => "LaserOff",
    }
}

impl Default for LaserTransition {
    fn default() -> Self {
        Self::LaserOn
    }
}

/// Spectral resolution requested from a sweep or interleaved scan.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanResolution {
    /// Bin width in wave numbers.
    WaveNumbers(f64),
    /// Let the controller bin at its natural resolution.
    NaturalBinning,
}

impl ScanResolution {
    pub const NATURAL_BINNING: &'static str = "NaturalBinning";
}

impl Default for ScanResolution {
    fn default() -> Self {
        Self::WaveNumbers(10.0)
    }
}

impl From<f64> for ScanResolution {
    fn from(value: f64) -> Self {
        Self::WaveNumbers(value)
    }
}

impl fmt::Display for ScanResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaveNumbers(v) => f.write_str(&format::float(*v)),
            Self::NaturalBinning => f.write_str(Self::NATURAL_BINNING),
        }
    }
}
