//! Token to note/chord conversion.
//!
//! Each generated event is parsed on its own. An event whose pitch or
//! duration token does not parse is skipped and reported, never fatal: the
//! scorer occasionally emits tokens that are not valid notation.

use std::fmt;

use tracing::warn;

use crate::types::GeneratedEvent;

/// Octave assumed when a note name has none.
pub const DEFAULT_OCTAVE: i32 = 4;

/// What a rendered element sounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// A single MIDI key.
    Note(u8),
    /// Several MIDI keys struck together, ascending and deduplicated.
    Chord(Vec<u8>),
}

/// A note or chord with its length in quarter notes.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicalElement {
    pub kind: ElementKind,
    pub quarter_length: f64,
}

impl MusicalElement {
    /// MIDI keys sounded by this element.
    pub fn keys(&self) -> &[u8] {
        match &self.kind {
            ElementKind::Note(key) => std::slice::from_ref(key),
            ElementKind::Chord(keys) => keys,
        }
    }
}

/// Why an event was left out of the rendered stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Duration token is not a number or `num/den` fraction.
    MalformedDuration(String),
    /// Duration parsed but is negative or not finite.
    UnplayableDuration(String),
    /// A note name is not letter + accidental + octave.
    MalformedPitch(String),
    /// A note name is valid but outside the MIDI key range.
    PitchOutOfRange(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedDuration(t) => write!(f, "malformed duration {:?}", t),
            SkipReason::UnplayableDuration(t) => write!(f, "unplayable duration {:?}", t),
            SkipReason::MalformedPitch(t) => write!(f, "malformed pitch {:?}", t),
            SkipReason::PitchOutOfRange(t) => write!(f, "pitch {:?} outside MIDI range", t),
        }
    }
}

/// Result of rendering one event.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(MusicalElement),
    Skipped(SkipReason),
}

/// An event that did not render, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub position: usize,
    pub reason: SkipReason,
}

/// Ordered elements ready for serialization, plus the skipped events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub elements: Vec<MusicalElement>,
    pub skipped: Vec<SkippedEvent>,
}

impl Score {
    /// Total length of the piece in quarter notes.
    pub fn total_quarter_length(&self) -> f64 {
        self.elements.iter().map(|e| e.quarter_length).sum()
    }
}

/// Renders events in order, skipping the ones that do not parse.
pub fn render(events: &[GeneratedEvent]) -> Score {
    let mut score = Score::default();

    for (position, event) in events.iter().enumerate() {
        match render_event(event) {
            RenderOutcome::Rendered(element) => score.elements.push(element),
            RenderOutcome::Skipped(reason) => {
                warn!(position, %reason, "skipping event");
                score.skipped.push(SkippedEvent { position, reason });
            }
        }
    }

    score
}

/// Renders a single event.
pub fn render_event(event: &GeneratedEvent) -> RenderOutcome {
    let quarter_length = match parse_duration(event.duration.as_str()) {
        Ok(q) => q,
        Err(reason) => return RenderOutcome::Skipped(reason),
    };

    let token = event.pitch.as_str();
    let kind = if event.pitch.is_chord() {
        let mut keys = Vec::new();
        for name in token.split('.') {
            match parse_note_name(name) {
                Ok(key) => keys.push(key),
                Err(reason) => return RenderOutcome::Skipped(reason),
            }
        }
        keys.sort_unstable();
        keys.dedup();
        ElementKind::Chord(keys)
    } else {
        match parse_note_name(token) {
            Ok(key) => ElementKind::Note(key),
            Err(reason) => return RenderOutcome::Skipped(reason),
        }
    };

    RenderOutcome::Rendered(MusicalElement {
        kind,
        quarter_length,
    })
}

/// Parses a duration token into a quarter-note length.
///
/// Tokens containing `/` are read as an integer fraction (`"1/3"`), all
/// others as a decimal (`"0.75"`). A zero length is kept and sounds as a
/// note-on and note-off on the same tick.
pub fn parse_duration(token: &str) -> Result<f64, SkipReason> {
    let malformed = || SkipReason::MalformedDuration(token.to_string());

    let value = if let Some((num, den)) = token.split_once('/') {
        let num: i64 = num.trim().parse().map_err(|_| malformed())?;
        let den: i64 = den.trim().parse().map_err(|_| malformed())?;
        if den == 0 {
            return Err(malformed());
        }
        num as f64 / den as f64
    } else {
        token.trim().parse::<f64>().map_err(|_| malformed())?
    };

    if !value.is_finite() || value < 0.0 {
        return Err(SkipReason::UnplayableDuration(token.to_string()));
    }

    Ok(value)
}

/// Parses a note name (`C4`, `F#3`, `B-2`, `Eb5`, `g`) into a MIDI key.
///
/// Letter A-G in either case, up to two accidentals of one kind (`#`
/// sharp, `-` or `b` flat), then an optional single octave digit
/// (default 4). C4 is key 60.
pub fn parse_note_name(name: &str) -> Result<u8, SkipReason> {
    let malformed = || SkipReason::MalformedPitch(name.to_string());

    let mut chars = name.chars();
    let pitch_class = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(malformed()),
    };

    let rest = chars.as_str();
    let accidental_len = rest
        .chars()
        .take_while(|c| matches!(c, '#' | '-' | 'b'))
        .count();
    let (accidentals, octave) = rest.split_at(accidental_len);

    let alter = match accidentals {
        "" => 0,
        "#" => 1,
        "##" => 2,
        "-" | "b" => -1,
        "--" | "bb" => -2,
        _ => return Err(malformed()),
    };

    let octave = match octave {
        "" => DEFAULT_OCTAVE,
        digit if digit.len() == 1 => digit
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .map(|d| d as i32)
            .ok_or_else(malformed)?,
        _ => return Err(malformed()),
    };

    let key = (octave + 1) * 12 + pitch_class + alter;
    u8::try_from(key)
        .ok()
        .filter(|k| *k <= 127)
        .ok_or_else(|| SkipReason::PitchOutOfRange(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_duration() {
        let q = parse_duration("1/3").unwrap();
        assert!((q - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(parse_duration("0.5").unwrap(), 0.5);
        assert_eq!(parse_duration("2").unwrap(), 2.0);
        assert_eq!(parse_duration("0.0").unwrap(), 0.0);
        assert_eq!(parse_duration("0/4").unwrap(), 0.0);
    }

    #[test]
    fn bad_durations() {
        assert!(matches!(parse_duration("1/0"), Err(SkipReason::MalformedDuration(_))));
        assert!(matches!(parse_duration("a/3"), Err(SkipReason::MalformedDuration(_))));
        assert!(matches!(parse_duration("quarter"), Err(SkipReason::MalformedDuration(_))));
        assert!(matches!(parse_duration("-1/4"), Err(SkipReason::UnplayableDuration(_))));
        assert!(matches!(parse_duration("inf"), Err(SkipReason::UnplayableDuration(_))));
    }

    #[test]
    fn note_names() {
        assert_eq!(parse_note_name("C4"), Ok(60));
        assert_eq!(parse_note_name("A4"), Ok(69));
        assert_eq!(parse_note_name("F#3"), Ok(54));
        assert_eq!(parse_note_name("B-2"), Ok(46));
        assert_eq!(parse_note_name("Eb5"), Ok(75));
        assert_eq!(parse_note_name("C##4"), Ok(62));
        assert_eq!(parse_note_name("g"), Ok(67));
        assert_eq!(parse_note_name("C-0"), Ok(11));
    }

    #[test]
    fn bad_note_names() {
        assert!(matches!(parse_note_name("Z9"), Err(SkipReason::MalformedPitch(_))));
        assert!(matches!(parse_note_name(""), Err(SkipReason::MalformedPitch(_))));
        assert!(matches!(parse_note_name("C#-4"), Err(SkipReason::MalformedPitch(_))));
        assert!(matches!(parse_note_name("C44"), Err(SkipReason::MalformedPitch(_))));
        assert!(matches!(parse_note_name("rest"), Err(SkipReason::MalformedPitch(_))));
        assert!(matches!(parse_note_name("G#9"), Err(SkipReason::PitchOutOfRange(_))));
    }

    #[test]
    fn chord_token_renders_three_keys() {
        let outcome = render_event(&GeneratedEvent::new("C4.E4.G4", "1.0"));
        match outcome {
            RenderOutcome::Rendered(element) => {
                assert_eq!(element.kind, ElementKind::Chord(vec![60, 64, 67]));
                assert_eq!(element.keys().len(), 3);
                assert_eq!(element.quarter_length, 1.0);
            }
            RenderOutcome::Skipped(reason) => panic!("chord skipped: {}", reason),
        }
    }

    #[test]
    fn chord_with_bad_member_is_skipped() {
        let outcome = render_event(&GeneratedEvent::new("C4.X4.G4", "1.0"));
        assert!(matches!(outcome, RenderOutcome::Skipped(SkipReason::MalformedPitch(_))));
        let outcome = render_event(&GeneratedEvent::new("C4..G4", "1.0"));
        assert!(matches!(outcome, RenderOutcome::Skipped(_)));
    }

    #[test]
    fn malformed_event_does_not_stop_rendering() {
        let events = vec![
            GeneratedEvent::new("C4", "1/3"),
            GeneratedEvent::new("Z9", "1.0"),
            GeneratedEvent::new("C4.E4.G4", "0.5"),
            GeneratedEvent::new("D4", "1/0"),
            GeneratedEvent::new("E4", "2.0"),
        ];

        let score = render(&events);
        assert_eq!(score.elements.len(), 3);
        assert_eq!(score.skipped.len(), 2);
        assert_eq!(score.skipped[0].position, 1);
        assert_eq!(score.skipped[1].position, 3);

        assert!((score.elements[0].quarter_length - 0.333_333).abs() < 1e-6);
        assert_eq!(score.elements[1].keys(), &[60, 64, 67]);
        assert_eq!(score.elements[2].kind, ElementKind::Note(64));
    }

    #[test]
    fn zero_length_event_is_kept() {
        let score = render(&[
            GeneratedEvent::new("C4", "0.0"),
            GeneratedEvent::new("E4", "1.5"),
        ]);
        assert!(score.skipped.is_empty());
        assert_eq!(score.elements.len(), 2);
        assert_eq!(score.elements[0].quarter_length, 0.0);
        assert_eq!(score.total_quarter_length(), 1.5);
    }

    #[test]
    fn empty_input_renders_empty_score() {
        let score = render(&[]);
        assert!(score.elements.is_empty());
        assert!(score.skipped.is_empty());
        assert_eq!(score.total_quarter_length(), 0.0);
    }
}
