//! Playback-side state around the measure timing core
//!
//! - `sequencer`: tempo-map transport (ticks <-> µs, tempo factor, start/stop)
//! - `clock_format`: `m:ss` position text
//! - `measure_field`: the editable "current measure" field
//! - `session`: [`PlaybackSession`], one loaded file with all of the above

pub mod clock_format;
pub mod measure_field;
pub mod sequencer;
pub mod session;

pub use clock_format::{format_clock, format_position};
pub use measure_field::MeasureField;
pub use sequencer::Sequencer;
pub use session::{ContentInfo, PlaybackSession};
