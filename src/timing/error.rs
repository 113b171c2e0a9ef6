//! Error types for measure mapping
//!
//! `NoSignatureData` is the only failure a host normally sees on load, and it
//! is not fatal: playback continues without measure display. Malformed partial
//! text never reaches callers; it is recovered as "no pickup".

use thiserror::Error;

/// Failure reported by a tick/clock transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureMapError {
    /// The event list contains no time signature change
    #[error("did not find any time signature events")]
    NoSignatureData,

    /// A signature whose measures would be zero ticks long
    #[error("time signature {numerator}/2^{denominator_exponent} at tick {tick} has no measurable length")]
    InvalidSignature {
        tick: u64,
        numerator: u8,
        denominator_exponent: u8,
    },

    /// Bar text of a measure label is not a usable measure number
    #[error("malformed measure label '{0}'")]
    MalformedLabel(String),

    /// Partial text is not `<num>/<den>` with positive integers
    #[error("malformed partial '{0}'")]
    MalformedPartial(String),

    /// No measure grid is available (nothing loaded or last build failed)
    #[error("measure grid is not available")]
    GridAbsent,

    /// Transport clock went backwards while sampling boundaries
    #[error("clock decreased from {previous} to {current} µs at tick {tick}")]
    NonMonotonicClock { tick: u64, previous: i64, current: i64 },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, MeasureMapError>;
