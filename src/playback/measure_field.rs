//! "Go to measure" text field state
//!
//! The field shows the measure being played and accepts a typed label to jump
//! to. While the user is typing, playback updates must not overwrite the
//! text; an empty field means "do not track".

use crate::timing::position_codec::split_label;
use crate::timing::{MeasureTimeMapper, Transport};

/// Clock movement (µs) below which the displayed measure is not refreshed
pub const MEASURE_UPDATE_THRESHOLD_MICROS: i64 = 10_000;

/// Longest accepted field text, in characters
pub const MEASURE_TEXT_LIMIT: usize = 11;

#[derive(Debug, Clone)]
pub struct MeasureField {
    text: String,
    /// Clock of the last refresh; `None` stops tracking playback
    last_value: Option<i64>,
    ignore_next_update: bool,
    editable: bool,
}

impl Default for MeasureField {
    fn default() -> Self {
        Self {
            text: String::new(),
            last_value: None,
            ignore_next_update: false,
            editable: true,
        }
    }
}

impl MeasureField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_tracking(&self) -> bool {
        self.last_value.is_some()
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Locked while playing
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// User typed into the field. Returns false if the field is locked.
    pub fn edit(&mut self, text: &str) -> bool {
        if !self.editable {
            return false;
        }
        self.text = text.chars().take(MEASURE_TEXT_LIMIT).collect();
        self.last_value = if self.text.trim().is_empty() { None } else { Some(0) };
        true
    }

    /// User pressed return: clock time to seek to, if the label resolves
    pub fn submit<T: Transport + ?Sized>(
        &mut self,
        mapper: &mut MeasureTimeMapper,
        transport: &mut T,
        total_duration: i64,
    ) -> Option<i64> {
        if self.text.trim().is_empty() {
            self.last_value = None;
            return None;
        }
        match mapper.measure_label_to_clock_time(&self.text, total_duration, transport) {
            Ok(time) if time >= 0 => {
                // The seek itself must not rewrite what the user typed
                self.ignore_next_update = true;
                self.last_value = Some(0);
                Some(time)
            }
            Ok(_) => {
                self.last_value = None;
                None
            }
            Err(e) => {
                log::debug!("Measure label '{}' not applied: {}", self.text, e);
                self.last_value = None;
                None
            }
        }
    }

    /// Playback moved to `clock`. Returns whether the text changed.
    pub fn update(&mut self, clock: i64, max: i64, mapper: &MeasureTimeMapper) -> bool {
        if self.ignore_next_update {
            self.ignore_next_update = false;
            return false;
        }
        let Some(last) = self.last_value else {
            return false;
        };
        if clock == max || (last - clock).abs() <= MEASURE_UPDATE_THRESHOLD_MICROS {
            return false;
        }

        self.last_value = Some(clock);
        match mapper.clock_to_measure(clock) {
            Some(bar) => {
                let suffix = match split_label(&self.text).1 {
                    Some(partial) => format!(":{}", partial),
                    None => String::new(),
                };
                self.text = format!("{}{}", bar, suffix);
            }
            None => {
                self.last_value = None;
                self.text.clear();
            }
        }
        true
    }

    /// New content was loaded (or reloaded)
    pub fn content_changed(&mut self, grid_valid: bool) {
        if grid_valid {
            self.last_value = if self.text.is_empty() { None } else { Some(0) };
        } else {
            self.text.clear();
            self.last_value = None;
        }
    }
}
