//! MIDI output for rendered scores.
//!
//! Converts a [`Score`] into a single-track Standard MIDI File. Elements are
//! laid end to end: each one starts when the previous one stops, and all
//! keys of a chord start and stop together.

use std::path::Path;

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

use crate::error::{ErrorCode, Result, SongsmithError};

use super::notation::Score;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Tempo written into the file.
pub const DEFAULT_TEMPO_BPM: u32 = 120;

/// Note-on velocity for every key.
pub const DEFAULT_VELOCITY: u8 = 90;

/// Channel all notes are written on.
const CHANNEL: u8 = 0;

/// Largest delta a track event can carry.
const MAX_DELTA: u32 = (1 << 28) - 1;

/// Writes a score to a MIDI file, replacing any existing file.
pub fn write_midi(score: &Score, path: &Path) -> Result<()> {
    let buf = write_midi_to_buffer(score)?;
    write_midi_bytes(&buf, path)
}

/// Writes already-serialized MIDI bytes, replacing any existing file.
pub fn write_midi_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, bytes)
        .map_err(|e| SongsmithError::render_write_failed(path.display().to_string(), e))
}

/// Serializes a score to in-memory MIDI bytes.
pub fn write_midi_to_buffer(score: &Score) -> Result<Vec<u8>> {
    let smf = score_to_smf(score);
    let mut buf = Vec::new();
    smf.write(&mut buf).map_err(|e| {
        SongsmithError::new(
            ErrorCode::RenderWriteFailed,
            format!("Failed to serialize MIDI: {}", e),
        )
    })?;
    Ok(buf)
}

/// Converts a quarter-note length to ticks, rounding to the nearest tick.
pub fn quarter_length_to_ticks(quarter_length: f64) -> u32 {
    let ticks = (quarter_length * TICKS_PER_QUARTER as f64).round();
    ticks.clamp(0.0, MAX_DELTA as f64) as u32
}

/// Convert a Score to an in-memory SMF.
pub fn score_to_smf(score: &Score) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let channel = u4::new(CHANNEL);
    let mut track: Track<'static> = Vec::new();

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"songsmith")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
            60_000_000 / DEFAULT_TEMPO_BPM,
        ))),
    });
    // Acoustic grand piano
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange { program: u7::new(0) },
        },
    });

    for element in &score.elements {
        let keys = element.keys();

        for key in keys {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: u7::new(*key),
                        vel: u7::new(DEFAULT_VELOCITY),
                    },
                },
            });
        }

        let length = quarter_length_to_ticks(element.quarter_length);
        for (i, key) in keys.iter().enumerate() {
            track.push(TrackEvent {
                delta: u28::new(if i == 0 { length } else { 0 }),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: u7::new(*key),
                        vel: u7::new(0),
                    },
                },
            });
        }
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);
    smf
}
