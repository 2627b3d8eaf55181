//! Rendering of generated events into notation and MIDI.

pub mod midi;
pub mod notation;

pub use midi::{
    score_to_smf, write_midi, write_midi_bytes, write_midi_to_buffer, TICKS_PER_QUARTER,
};
pub use notation::{
    parse_duration, parse_note_name, render, render_event, ElementKind, MusicalElement,
    RenderOutcome, Score, SkipReason, SkippedEvent,
};
