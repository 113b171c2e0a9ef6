//! Measure timing core
//!
//! Maps playback clock time (µs) to measure numbers and back, from the time
//! signature changes of a sequence.
//!
//! ## Sub-modules
//! - `signature_timeline` - regions of constant measure length
//! - `measure_grid` - boundary clock times sampled from a [`Transport`]
//! - `position_codec` - `"<bar>[:<num>/<den>]"` label parsing
//! - `mapper` - [`MeasureTimeMapper`], the cached grid plus pickup state
//! - `transport` - tick/clock contract and the cursor guard
//!
//! ## Example
//! ```rust,ignore
//! let mut mapper = MeasureTimeMapper::new();
//! mapper.load_content(&sequence.events, sequence.ticks_per_quarter, sequence.tick_length, &mut sequencer)?;
//! let bar = mapper.clock_to_measure(sequencer.microsecond_position());
//! ```

pub mod error;
pub mod mapper;
pub mod measure_grid;
pub mod position_codec;
pub mod signature_timeline;
pub mod transport;

pub use error::{MeasureMapError, TransportError};
pub use mapper::MeasureTimeMapper;
pub use measure_grid::{GridState, MeasureGrid};
pub use signature_timeline::SignatureTimeline;
pub use transport::{CursorGuard, Transport};
