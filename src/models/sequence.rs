//! Lean event model for a decoded performance stream
//!
//! Only what the measure mapping and the tempo-map transport need: absolute
//! tick positions, meta tags with raw payloads, and the tempo map.

use serde::Serialize;

/// Meta tag of a time signature change (payload: num, denom exponent, clocks, 32nds)
pub const TIME_SIGNATURE_META: u8 = 0x58;

/// Meta tag of a tempo change (payload: 24-bit big-endian microseconds per quarter)
pub const TEMPO_META: u8 = 0x51;

/// Meta tag of the end-of-track marker
pub const END_OF_TRACK_META: u8 = 0x2F;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    pub ticks_per_quarter: u16,
    pub tick_length: u64,          // Largest absolute tick of any event
    pub tempos: Vec<Tempo>,        // Sorted by tick
    pub events: Vec<SequenceEvent>, // All tracks merged, sorted by tick
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tempo {
    pub tick: u64,
    pub micros_per_quarter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceEvent {
    pub tick: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Channel voice message (note, controller, program...)
    Midi { channel: u8, data: Vec<u8> },
    /// System exclusive or escape payload
    SysEx(Vec<u8>),
    Meta { tag: u8, data: Vec<u8> },
}

impl SequenceEvent {
    pub fn meta(tick: u64, tag: u8, data: Vec<u8>) -> Self {
        Self {
            tick,
            kind: EventKind::Meta { tag, data },
        }
    }

    /// Build a time signature event from numerator and denominator exponent
    /// (e.g. 6/8 is `time_signature(tick, 6, 3)`)
    pub fn time_signature(tick: u64, numerator: u8, denominator_exponent: u8) -> Self {
        // 24 MIDI clocks per click, 8 32nd notes per quarter
        Self::meta(
            tick,
            TIME_SIGNATURE_META,
            vec![numerator, denominator_exponent, 24, 8],
        )
    }

    pub fn tempo(tick: u64, micros_per_quarter: u32) -> Self {
        let bytes = micros_per_quarter.to_be_bytes();
        Self::meta(tick, TEMPO_META, bytes[1..].to_vec())
    }

    /// Payload of a meta event carrying `tag`, if this is one
    pub fn meta_payload(&self, tag: u8) -> Option<&[u8]> {
        match &self.kind {
            EventKind::Meta { tag: t, data } if *t == tag => Some(data),
            _ => None,
        }
    }
}

impl Sequence {
    /// Sequence with no events other than what the caller pushes
    pub fn empty(ticks_per_quarter: u16) -> Self {
        Self {
            ticks_per_quarter,
            tick_length: 0,
            tempos: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Append an event, keeping tick order and the derived tempo map and length in sync
    pub fn push(&mut self, event: SequenceEvent) {
        if let Some(data) = event.meta_payload(TEMPO_META) {
            if let Some(micros_per_quarter) = decode_tempo(data) {
                let index = self.tempos.partition_point(|t| t.tick <= event.tick);
                self.tempos.insert(
                    index,
                    Tempo {
                        tick: event.tick,
                        micros_per_quarter,
                    },
                );
            }
        }
        self.tick_length = self.tick_length.max(event.tick);
        let index = self.events.partition_point(|e| e.tick <= event.tick);
        self.events.insert(index, event);
    }
}

/// Decode a 3-byte big-endian tempo payload
pub fn decode_tempo(data: &[u8]) -> Option<u32> {
    match data {
        [a, b, c, ..] => Some(u32::from_be_bytes([0, *a, *b, *c])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_payload_roundtrip() {
        let event = SequenceEvent::tempo(0, 500_000);
        let data = event.meta_payload(TEMPO_META).unwrap();
        assert_eq!(data, &[0x07, 0xA1, 0x20]);
        assert_eq!(decode_tempo(data), Some(500_000));
    }

    #[test]
    fn test_decode_tempo_short_payload() {
        assert_eq!(decode_tempo(&[0x07, 0xA1]), None);
    }

    #[test]
    fn test_push_keeps_order_and_tempo_map() {
        let mut seq = Sequence::empty(480);
        seq.push(SequenceEvent::time_signature(1920, 3, 2));
        seq.push(SequenceEvent::tempo(960, 600_000));
        seq.push(SequenceEvent::time_signature(0, 4, 2));

        let ticks: Vec<u64> = seq.events.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![0, 960, 1920]);
        assert_eq!(seq.tick_length, 1920);
        assert_eq!(
            seq.tempos,
            vec![Tempo { tick: 960, micros_per_quarter: 600_000 }]
        );
    }

    #[test]
    fn test_meta_payload_ignores_other_tags() {
        let event = SequenceEvent::time_signature(0, 4, 2);
        assert!(event.meta_payload(TEMPO_META).is_none());
        assert_eq!(event.meta_payload(TIME_SIGNATURE_META), Some(&[4u8, 2, 24, 8][..]));
    }
}
