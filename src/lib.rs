//! MIDI Measure Map WASM Module
//!
//! Maps playback clock time of a Standard MIDI File to measure numbers (with
//! an optional pickup measure) and back, for a player's "go to measure" field.

pub mod api;
pub mod converters;
pub mod models;
pub mod playback;
pub mod timing;

// Re-export commonly used types
pub use models::*;
pub use playback::{PlaybackSession, Sequencer};
pub use timing::{MeasureMapError, MeasureTimeMapper};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        wasm_warn!("Logger already initialized: {}", e);
    }

    log::info!("MIDI measure map WASM module initialized");
}
