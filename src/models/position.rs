//! Musical position values: pickup offsets and measure labels

use num_rational::Ratio;
use serde::{Serialize, Serializer};

/// Length of a pickup measure as a fraction of a whole note (`1/4` = one quarter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialOffset(Ratio<u32>);

impl PartialOffset {
    /// Returns `None` unless both parts are positive
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || denominator == 0 {
            return None;
        }
        Some(Self(Ratio::new(numerator, denominator)))
    }

    pub fn numerator(&self) -> u32 {
        *self.0.numer()
    }

    pub fn denominator(&self) -> u32 {
        *self.0.denom()
    }

    /// `ticks_per_quarter * 4 * num / den`, truncated
    pub fn ticks(&self, ticks_per_quarter: u16) -> u64 {
        ticks_per_quarter as u64 * 4 * self.numerator() as u64 / self.denominator() as u64
    }
}

impl std::fmt::Display for PartialOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

impl Serialize for PartialOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parsed `"<bar>[:<num>/<den>]"` text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeasureLabel {
    /// 1-based measure number; 0 addresses the pickup measure
    pub bar: u32,
    pub partial: Option<PartialOffset>,
}

impl std::fmt::Display for MeasureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.partial {
            Some(partial) => write!(f, "{}:{}", self.bar, partial),
            None => write!(f, "{}", self.bar),
        }
    }
}
