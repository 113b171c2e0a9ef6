//! Tempo-map transport
//!
//! Converts ticks to elapsed microseconds using the piecewise-constant tempo
//! map of a [`Sequence`], with a playback tempo factor on top. Its tick cursor
//! is the one measure grid construction borrows.

use crate::converters::midi::DEFAULT_MICROS_PER_QUARTER;
use crate::models::Sequence;
use crate::timing::{Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TempoSegment {
    tick: u64,
    micros_per_quarter: u32,
    /// Elapsed µs at `tick` at a tempo factor of 1
    micros_at: u64,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    ticks_per_quarter: u16,
    tick_length: u64,
    segments: Vec<TempoSegment>,
    tick_position: u64,
    tempo_factor: f64,
    running: bool,
}

impl Sequencer {
    pub fn from_sequence(sequence: &Sequence) -> Self {
        let tpq = sequence.ticks_per_quarter.max(1);
        let mut segments = vec![TempoSegment {
            tick: 0,
            micros_per_quarter: DEFAULT_MICROS_PER_QUARTER,
            micros_at: 0,
        }];

        for tempo in &sequence.tempos {
            let last = segments[segments.len() - 1];
            if tempo.tick == last.tick {
                // Later change at the same tick wins
                let len = segments.len();
                segments[len - 1].micros_per_quarter = tempo.micros_per_quarter;
                continue;
            }
            segments.push(TempoSegment {
                tick: tempo.tick,
                micros_per_quarter: tempo.micros_per_quarter,
                micros_at: last.micros_at + span_micros(tempo.tick - last.tick, last.micros_per_quarter, tpq),
            });
        }

        Self {
            ticks_per_quarter: tpq,
            tick_length: sequence.tick_length,
            segments,
            tick_position: 0,
            tempo_factor: 1.0,
            running: false,
        }
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn tick_length(&self) -> u64 {
        self.tick_length
    }

    pub fn tick_position(&self) -> u64 {
        self.tick_position
    }

    pub fn set_tick_position(&mut self, tick: u64) {
        self.tick_position = tick;
    }

    /// Elapsed µs at `tick`, scaled by the tempo factor
    pub fn micros_at_tick(&self, tick: u64) -> i64 {
        let index = self.segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
        let segment = &self.segments[index];
        let raw = segment.micros_at
            + span_micros(tick - segment.tick, segment.micros_per_quarter, self.ticks_per_quarter);
        (raw as f64 / self.tempo_factor) as i64
    }

    /// Tick reached after `micros` of playback at the current tempo factor
    pub fn tick_at_micros(&self, micros: i64) -> u64 {
        let raw = (micros.max(0) as f64 * self.tempo_factor) as u64;
        let index = self.segments.partition_point(|s| s.micros_at <= raw).saturating_sub(1);
        let segment = &self.segments[index];
        let ticks = (raw - segment.micros_at) as u128 * self.ticks_per_quarter as u128
            / segment.micros_per_quarter.max(1) as u128;
        segment.tick + ticks as u64
    }

    pub fn microsecond_position(&self) -> i64 {
        self.micros_at_tick(self.tick_position)
    }

    pub fn microsecond_length(&self) -> i64 {
        self.micros_at_tick(self.tick_length)
    }

    /// Seek by clock time, clamped to the content
    pub fn set_microsecond_position(&mut self, micros: i64) {
        let micros = micros.clamp(0, self.microsecond_length());
        self.tick_position = self.tick_at_micros(micros).min(self.tick_length);
    }

    pub fn tempo_factor(&self) -> f64 {
        self.tempo_factor
    }

    /// Scale playback speed. Measure grids built earlier keep the old times.
    pub fn set_tempo_factor(&mut self, factor: f64) -> Result<(), TransportError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(TransportError(format!("invalid tempo factor {}", factor)));
        }
        self.tempo_factor = factor;
        Ok(())
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.tick_position >= self.tick_length
    }
}

/// Duration of `ticks` at `micros_per_quarter`, truncated
fn span_micros(ticks: u64, micros_per_quarter: u32, ticks_per_quarter: u16) -> u64 {
    (ticks as u128 * micros_per_quarter as u128 / ticks_per_quarter as u128) as u64
}

impl Transport for Sequencer {
    fn position(&self) -> u64 {
        self.tick_position
    }

    fn set_position(&mut self, tick: u64) -> Result<(), TransportError> {
        self.set_tick_position(tick);
        Ok(())
    }

    fn clock_micros(&self) -> Result<i64, TransportError> {
        Ok(self.microsecond_position())
    }

    fn total_clock_micros(&self) -> i64 {
        self.microsecond_length()
    }
}
