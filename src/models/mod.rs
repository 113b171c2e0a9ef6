//! Data model for measure mapping
//!
//! - `sequence`: decoded event stream (ticks, meta payloads, tempo map)
//! - `signature`: time signature regions and ticks-per-measure
//! - `position`: pickup offsets and measure labels

pub mod position;
pub mod sequence;
pub mod signature;

pub use position::{MeasureLabel, PartialOffset};
pub use sequence::*;
pub use signature::SignatureRegion;
