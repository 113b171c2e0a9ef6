//! Time signature regions
//!
//! A region spans from one signature change to the next; inside it every
//! measure has the same length in ticks.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRegion {
    pub start_tick: u64,
    pub numerator: u8,
    pub denominator_exponent: u8,
    pub ticks_per_measure: u64,
}

impl SignatureRegion {
    /// Derive a region from a signature change.
    ///
    /// Returns `None` when the signature cannot produce a measure of at least
    /// one tick (zero numerator, or a denominator so fine that a single beat
    /// truncates to zero ticks).
    pub fn new(
        start_tick: u64,
        numerator: u8,
        denominator_exponent: u8,
        ticks_per_quarter: u16,
    ) -> Option<Self> {
        let ticks_per_measure =
            ticks_per_measure(numerator, denominator_exponent, ticks_per_quarter)?;
        Some(Self {
            start_tick,
            numerator,
            denominator_exponent,
            ticks_per_measure,
        })
    }

    /// Denominator as written (4 in 3/4)
    pub fn denominator(&self) -> u64 {
        1u64 << self.denominator_exponent.min(63)
    }

    /// Boundary following `tick` if the region continued uninterrupted
    pub fn next_measure_tick(&self, tick: u64) -> u64 {
        tick.saturating_add(self.ticks_per_measure)
    }
}

impl std::fmt::Display for SignatureRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{} {}",
            self.start_tick,
            self.numerator,
            self.denominator(),
            self.ticks_per_measure
        )
    }
}

/// `numerator * (ticks_per_quarter * 4 / 2^denominator_exponent)`, truncating
/// the per-beat division the way integer casts do.
pub fn ticks_per_measure(
    numerator: u8,
    denominator_exponent: u8,
    ticks_per_quarter: u16,
) -> Option<u64> {
    let base = 1u64.checked_shl(denominator_exponent as u32)?;
    let ticks_per_beat = (ticks_per_quarter as u64 * 4) / base;
    let ticks = numerator as u64 * ticks_per_beat;
    (ticks > 0).then_some(ticks)
}
