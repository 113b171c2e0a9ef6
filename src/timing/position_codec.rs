//! Measure label text: `"<bar>[:<num>/<den>]"`
//!
//! Examples: `"5"`, `"9:3/8"`, `"0:1/4"`. The bar must be a non-negative
//! integer. A partial that does not parse is treated as absent, so a
//! half-typed field never disturbs playback.

use crate::models::{MeasureLabel, PartialOffset};
use crate::timing::error::{MeasureMapError, Result};

/// Parse a full measure label
pub fn parse_label(text: &str) -> Result<MeasureLabel> {
    let (bar_text, partial_text) = split_label(text);
    let bar = bar_text
        .trim()
        .parse::<u32>()
        .map_err(|_| MeasureMapError::MalformedLabel(text.to_string()))?;

    Ok(MeasureLabel {
        bar,
        partial: partial_text.and_then(partial_or_none),
    })
}

/// Split `text` at the first `:` into bar text and optional partial text
pub fn split_label(text: &str) -> (&str, Option<&str>) {
    match text.split_once(':') {
        Some((bar, partial)) => (bar, Some(partial)),
        None => (text, None),
    }
}

/// Strictly parse `"<num>/<den>"` with positive integers
pub fn parse_partial(text: &str) -> Result<PartialOffset> {
    let malformed = || MeasureMapError::MalformedPartial(text.to_string());
    let (num, den) = text.split_once('/').ok_or_else(malformed)?;
    let num = num.trim().parse::<u32>().map_err(|_| malformed())?;
    let den = den.trim().parse::<u32>().map_err(|_| malformed())?;
    PartialOffset::new(num, den).ok_or_else(malformed)
}

/// Lenient partial parsing: empty or malformed text means "no pickup"
pub fn partial_or_none(text: &str) -> Option<PartialOffset> {
    if text.trim().is_empty() {
        return None;
    }
    match parse_partial(text) {
        Ok(partial) => Some(partial),
        Err(e) => {
            log::debug!("Ignoring partial: {}", e);
            None
        }
    }
}

/// Pickup length in ticks (`ticks_per_quarter * 4 * num / den`, truncated)
pub fn partial_offset_ticks(partial: Option<PartialOffset>, ticks_per_quarter: u16) -> u64 {
    partial.map_or(0, |p| p.ticks(ticks_per_quarter))
}
