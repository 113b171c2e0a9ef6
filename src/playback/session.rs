//! One loaded MIDI file with its transport, measure mapper and field state

use serde::Serialize;

use crate::converters::midi::{load_smf, SmfError};
use crate::models::{PartialOffset, Sequence, SignatureRegion};
use crate::playback::clock_format::format_position;
use crate::playback::measure_field::MeasureField;
use crate::playback::sequencer::Sequencer;
use crate::timing::{MeasureMapError, MeasureTimeMapper, Transport, TransportError};

/// Summary handed to the host after a load
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub ticks_per_quarter: u16,
    pub tick_length: u64,
    pub microsecond_length: i64,
    /// `None` when the file has no time signature data
    pub measure_count: Option<usize>,
    pub partial: Option<PartialOffset>,
    pub regions: Vec<SignatureRegion>,
}

#[derive(Debug, Clone)]
pub struct PlaybackSession {
    sequence: Sequence,
    sequencer: Sequencer,
    mapper: MeasureTimeMapper,
    field: MeasureField,
}

impl PlaybackSession {
    /// Decode SMF bytes and build the measure grid.
    ///
    /// Only decoding errors fail; a file without time signatures loads with
    /// no measure grid.
    pub fn load(bytes: &[u8]) -> Result<Self, SmfError> {
        Ok(Self::from_sequence(load_smf(bytes)?))
    }

    pub fn from_sequence(sequence: Sequence) -> Self {
        let mut sequencer = Sequencer::from_sequence(&sequence);
        let mut mapper = MeasureTimeMapper::new();
        if let Err(e) = mapper.load_content(
            &sequence.events,
            sequence.ticks_per_quarter,
            sequence.tick_length,
            &mut sequencer,
        ) {
            log::warn!("No measure display for this content: {}", e);
        }
        let mut field = MeasureField::new();
        field.content_changed(mapper.grid().is_valid());

        Self {
            sequence,
            sequencer,
            mapper,
            field,
        }
    }

    pub fn content_info(&self) -> ContentInfo {
        ContentInfo {
            ticks_per_quarter: self.sequence.ticks_per_quarter,
            tick_length: self.sequence.tick_length,
            microsecond_length: self.sequencer.microsecond_length(),
            measure_count: self.mapper.grid().valid().map(|grid| grid.len()),
            partial: self.mapper.partial(),
            regions: self.mapper.regions().to_vec(),
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn mapper(&self) -> &MeasureTimeMapper {
        &self.mapper
    }

    pub fn field(&self) -> &MeasureField {
        &self.field
    }

    /// Change the pickup. Playback is paused first, since the rebuild moves
    /// the transport cursor.
    pub fn set_partial(&mut self, partial_text: &str) -> Result<bool, MeasureMapError> {
        self.pause();
        self.mapper.set_partial(partial_text, &mut self.sequencer)
    }

    pub fn clock_to_measure(&self, clock: i64) -> Option<usize> {
        self.mapper.clock_to_measure(clock)
    }

    /// Start of the labelled measure; past-the-end labels give the content length
    pub fn measure_label_to_clock_time(&mut self, label: &str) -> Result<i64, MeasureMapError> {
        self.pause();
        let total = self.sequencer.total_clock_micros();
        self.mapper
            .measure_label_to_clock_time(label, total, &mut self.sequencer)
    }

    /// Resolve `label` and seek there. Returns the new clock position.
    pub fn jump_to_label(&mut self, label: &str) -> Result<i64, MeasureMapError> {
        let time = self.measure_label_to_clock_time(label)?;
        self.seek(time);
        Ok(time)
    }

    pub fn seek(&mut self, micros: i64) {
        self.sequencer.set_microsecond_position(micros);
    }

    pub fn position_micros(&self) -> i64 {
        self.sequencer.microsecond_position()
    }

    /// Grid times are not resampled; they describe the tempo at build time
    pub fn set_tempo_factor(&mut self, factor: f64) -> Result<(), TransportError> {
        self.sequencer.set_tempo_factor(factor)
    }

    pub fn play(&mut self) {
        self.sequencer.start();
        self.field.set_editable(false);
    }

    pub fn pause(&mut self) {
        self.sequencer.stop();
        self.field.set_editable(true);
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_running()
    }

    /// Text for the position label (`m:ss/m:ss`), refreshing the measure field
    pub fn update_display(&mut self, micros: i64) -> String {
        let length = self.sequencer.microsecond_length();
        self.field.update(micros, length, &self.mapper);
        format_position(micros, length)
    }

    pub fn edit_measure_field(&mut self, text: &str) -> bool {
        self.field.edit(text)
    }

    /// Submit the measure field: seek to the labelled measure if it resolves
    pub fn submit_measure_field(&mut self) -> Option<i64> {
        self.pause();
        let total = self.sequencer.total_clock_micros();
        let time = self.field.submit(&mut self.mapper, &mut self.sequencer, total)?;
        self.seek(time);
        Some(time)
    }

    /// Measure grid as JSON, `null` when absent
    pub fn grid_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.mapper.grid().valid())
    }
}
