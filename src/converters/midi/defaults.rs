//! Default values for MIDI timing
//!
//! Used when a file leaves tempo unspecified and when building fixtures.

/// Tempo assumed before the first tempo event (500,000 µs per quarter = 120 BPM)
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

/// Default ticks per quarter note (MIDI resolution)
/// 480 is standard and provides good resolution
pub const DEFAULT_TPQ: u16 = 480;
