use crate::converters::midi::{Result, SmfError};
use crate::models::{EventKind, Sequence, SequenceEvent, Tempo, TEMPO_META, TIME_SIGNATURE_META};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

/// Parse SMF bytes into a tick-ordered Sequence (all tracks merged)
pub fn parse_smf(bytes: &[u8]) -> Result<Sequence> {
    let smf = Smf::parse(bytes).map_err(|e| SmfError::Parse(e.to_string()))?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        Timing::Timecode(fps, subframes) => {
            return Err(SmfError::UnsupportedTiming(format!(
                "SMPTE timecode ({:?}, {} subframes) has no ticks per quarter",
                fps,
                subframes
            )));
        }
    };
    if ticks_per_quarter == 0 {
        return Err(SmfError::Parse("ticks per quarter note is zero".to_string()));
    }

    let mut events = Vec::new();
    let mut tick_length = 0u64;

    for track in &smf.tracks {
        let mut abs_tick = 0u64;
        for ev in track {
            // Convert delta ticks -> absolute ticks
            abs_tick += ev.delta.as_int() as u64;
            tick_length = tick_length.max(abs_tick);

            let kind = match ev.kind {
                TrackEventKind::Midi { channel, message } => EventKind::Midi {
                    channel: channel.as_int(),
                    data: encode_midi_message(channel.as_int(), message),
                },
                TrackEventKind::SysEx(data) | TrackEventKind::Escape(data) => {
                    EventKind::SysEx(data.to_vec())
                }
                TrackEventKind::Meta(meta) => match meta_to_raw(meta) {
                    Some((tag, data)) => EventKind::Meta { tag, data },
                    None => continue,
                },
            };
            events.push(SequenceEvent { tick: abs_tick, kind });
        }
    }

    // Stable: events at the same tick keep track order
    events.sort_by_key(|e| e.tick);

    let tempos = events
        .iter()
        .filter_map(|e| {
            let data = e.meta_payload(TEMPO_META)?;
            let micros_per_quarter = crate::models::sequence::decode_tempo(data)?;
            Some(Tempo {
                tick: e.tick,
                micros_per_quarter,
            })
        })
        .collect();

    Ok(Sequence {
        ticks_per_quarter,
        tick_length,
        tempos,
        events,
    })
}

/// Status byte plus data bytes of a channel message
fn encode_midi_message(channel: u8, message: MidiMessage) -> Vec<u8> {
    let ch = channel & 0x0F;
    match message {
        MidiMessage::NoteOff { key, vel } => vec![0x80 | ch, key.as_int(), vel.as_int()],
        MidiMessage::NoteOn { key, vel } => vec![0x90 | ch, key.as_int(), vel.as_int()],
        MidiMessage::Aftertouch { key, vel } => vec![0xA0 | ch, key.as_int(), vel.as_int()],
        MidiMessage::Controller { controller, value } => {
            vec![0xB0 | ch, controller.as_int(), value.as_int()]
        }
        MidiMessage::ProgramChange { program } => vec![0xC0 | ch, program.as_int()],
        MidiMessage::ChannelAftertouch { vel } => vec![0xD0 | ch, vel.as_int()],
        MidiMessage::PitchBend { bend } => {
            let raw = bend.0.as_int();
            vec![0xE0 | ch, (raw & 0x7F) as u8, ((raw >> 7) & 0x7F) as u8]
        }
    }
}

/// Meta tag and raw payload, as stored in the file
///
/// End-of-track markers only contribute to the tick length and are dropped;
/// the writer emits its own.
fn meta_to_raw(meta: MetaMessage) -> Option<(u8, Vec<u8>)> {
    let raw = match meta {
        MetaMessage::TrackNumber(number) => (
            0x00,
            number.map(|n| n.to_be_bytes().to_vec()).unwrap_or_default(),
        ),
        MetaMessage::Text(data) => (0x01, data.to_vec()),
        MetaMessage::Copyright(data) => (0x02, data.to_vec()),
        MetaMessage::TrackName(data) => (0x03, data.to_vec()),
        MetaMessage::InstrumentName(data) => (0x04, data.to_vec()),
        MetaMessage::Lyric(data) => (0x05, data.to_vec()),
        MetaMessage::Marker(data) => (0x06, data.to_vec()),
        MetaMessage::CuePoint(data) => (0x07, data.to_vec()),
        MetaMessage::ProgramName(data) => (0x08, data.to_vec()),
        MetaMessage::DeviceName(data) => (0x09, data.to_vec()),
        MetaMessage::MidiChannel(channel) => (0x20, vec![channel.as_int()]),
        MetaMessage::MidiPort(port) => (0x21, vec![port.as_int()]),
        MetaMessage::EndOfTrack => return None,
        MetaMessage::Tempo(tempo) => (TEMPO_META, tempo.as_int().to_be_bytes()[1..].to_vec()),
        MetaMessage::SmpteOffset(_) => {
            log::debug!("Skipping SMPTE offset meta event");
            return None;
        }
        MetaMessage::TimeSignature(num, denom_exp, clocks, thirty_seconds) => (
            TIME_SIGNATURE_META,
            vec![num, denom_exp, clocks, thirty_seconds],
        ),
        MetaMessage::KeySignature(sharps, minor) => (0x59, vec![sharps as u8, minor as u8]),
        MetaMessage::SequencerSpecific(data) => (0x7F, data.to_vec()),
        MetaMessage::Unknown(tag, data) => (tag, data.to_vec()),
    };
    Some(raw)
}
