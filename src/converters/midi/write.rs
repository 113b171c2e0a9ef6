use crate::converters::midi::{Result, SmfError};
use crate::models::{decode_tempo, EventKind, Sequence, SequenceEvent, TEMPO_META, TIME_SIGNATURE_META};
use midly::num::{u14, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, Track, TrackEvent,
    TrackEventKind,
};

/// Write a Sequence to Standard MIDI File (SMF) Format 1
///
/// Track 0 carries the tempo and time signature map, track 1 everything else.
pub fn write_smf(sequence: &Sequence, out: &mut Vec<u8>) -> Result<()> {
    let (conductor, performance): (Vec<&SequenceEvent>, Vec<&SequenceEvent>) =
        sequence.events.iter().partition(|e| is_conductor_event(e));

    let tracks = vec![
        build_track(&conductor, sequence.tick_length)?,
        build_track(&performance, sequence.tick_length)?,
    ];

    let header = Header {
        format: Format::Parallel,
        timing: Timing::Metrical(sequence.ticks_per_quarter.into()),
    };

    let smf = Smf { header, tracks };

    smf.write(out)
        .map_err(|e| SmfError::Write(format!("Failed to write MIDI: {}", e)))?;

    Ok(())
}

fn is_conductor_event(event: &SequenceEvent) -> bool {
    event.meta_payload(TIME_SIGNATURE_META).is_some() || event.meta_payload(TEMPO_META).is_some()
}

fn build_track<'a>(events: &[&'a SequenceEvent], tick_length: u64) -> Result<Track<'a>> {
    let mut track = Vec::with_capacity(events.len() + 1);

    // Absolute ticks go in `delta` first, converted below
    for event in events {
        track.push(TrackEvent {
            delta: tick_to_u28(event.tick)?.into(),
            kind: to_track_event_kind(event)?,
        });
    }

    track.push(TrackEvent {
        delta: tick_to_u28(tick_length)?.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    // Stable sort: equal ticks keep sequence order, end of track stays last
    track.sort_by_key(|e| e.delta.as_int());
    convert_to_delta_times(&mut track);

    Ok(track)
}

fn tick_to_u28(tick: u64) -> Result<u32> {
    const U28_MAX: u64 = (1 << 28) - 1;
    if tick > U28_MAX {
        return Err(SmfError::Write(format!("tick {} exceeds SMF range", tick)));
    }
    Ok(tick as u32)
}

fn to_track_event_kind(event: &SequenceEvent) -> Result<TrackEventKind<'_>> {
    let kind = match &event.kind {
        EventKind::Midi { data, .. } => {
            let (channel, message) = decode_midi_message(data).ok_or_else(|| {
                SmfError::Write(format!("malformed channel message at tick {}", event.tick))
            })?;
            TrackEventKind::Midi { channel, message }
        }
        EventKind::SysEx(data) => TrackEventKind::SysEx(data),
        EventKind::Meta { tag, data } => TrackEventKind::Meta(raw_to_meta(*tag, data)),
    };
    Ok(kind)
}

fn raw_to_meta(tag: u8, data: &[u8]) -> MetaMessage<'_> {
    match (tag, data) {
        (TIME_SIGNATURE_META, [num, denom_exp, clocks, thirty_seconds, ..]) => {
            MetaMessage::TimeSignature(*num, *denom_exp, *clocks, *thirty_seconds)
        }
        (TEMPO_META, _) => match decode_tempo(data) {
            Some(tempo) => MetaMessage::Tempo(tempo.into()),
            None => MetaMessage::Unknown(tag, data),
        },
        _ => MetaMessage::Unknown(tag, data),
    }
}

fn decode_midi_message(data: &[u8]) -> Option<(u4, MidiMessage)> {
    let status = *data.first()?;
    let channel = u4::new(status & 0x0F);
    let d1 = || data.get(1).map(|b| u7::new(*b));
    let d2 = || data.get(2).map(|b| u7::new(*b));
    let message = match status & 0xF0 {
        0x80 => MidiMessage::NoteOff { key: d1()?, vel: d2()? },
        0x90 => MidiMessage::NoteOn { key: d1()?, vel: d2()? },
        0xA0 => MidiMessage::Aftertouch { key: d1()?, vel: d2()? },
        0xB0 => MidiMessage::Controller { controller: d1()?, value: d2()? },
        0xC0 => MidiMessage::ProgramChange { program: d1()? },
        0xD0 => MidiMessage::ChannelAftertouch { vel: d1()? },
        0xE0 => {
            let raw = d1()?.as_int() as u16 | ((d2()?.as_int() as u16) << 7);
            MidiMessage::PitchBend { bend: PitchBend(u14::new(raw)) }
        }
        _ => return None,
    };
    Some((channel, message))
}

/// Convert absolute tick times to delta times (time since previous event)
fn convert_to_delta_times(events: &mut [TrackEvent]) {
    let mut prev_tick = 0u32;
    for event in events.iter_mut() {
        let current_tick = event.delta.as_int();
        let delta = current_tick.saturating_sub(prev_tick);
        event.delta = delta.into();
        prev_tick = current_tick;
    }
}
