//! MIDI measure navigation WASM API
//!
//! JavaScript-facing functions over a single loaded playback session.
//!
//! # Module Structure
//!
//! - `helpers`: logging macros, serialization, and session storage
//! - `playback`: load/unload, measure lookup, seeking, and the measure field

pub mod helpers;
pub mod playback;

pub use playback::*;
