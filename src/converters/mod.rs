//! Format converters
//!
//! - `midi`: Standard MIDI File <-> [`Sequence`](crate::models::Sequence)

pub mod midi;
