//! Standard MIDI File input/output
//!
//! Decodes SMF bytes into the lean [`Sequence`] model consumed by the measure
//! mapper, and encodes a Sequence back to SMF format 1.
//!
//! ```rust,ignore
//! let sequence = load_smf(&bytes)?;
//! assert_eq!(sequence.ticks_per_quarter, 480);
//! ```

pub mod defaults;
mod parse;
mod write;

pub use defaults::{DEFAULT_MICROS_PER_QUARTER, DEFAULT_TPQ};
pub use parse::parse_smf;
pub use write::write_smf;

use crate::models::Sequence;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmfError {
    #[error("midi parse error: {0}")]
    Parse(String),
    #[error("unsupported timing: {0}")]
    UnsupportedTiming(String),
    #[error("midi write error: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, SmfError>;

/// Decode SMF bytes into a Sequence
///
/// # Arguments
/// * `bytes` - Raw Standard MIDI File contents
///
/// # Returns
/// * All tracks merged into one tick-ordered event list, with tempo map
pub fn load_smf(bytes: &[u8]) -> Result<Sequence> {
    let sequence = parse_smf(bytes)?;
    log::info!(
        "Loaded SMF: tpq={}, {} events, {} tempo changes, tick length {}",
        sequence.ticks_per_quarter,
        sequence.events.len(),
        sequence.tempos.len(),
        sequence.tick_length
    );
    Ok(sequence)
}

/// Encode a Sequence as SMF bytes
pub fn sequence_to_smf(sequence: &Sequence) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_smf(sequence, &mut out)?;
    Ok(out)
}
