//! Token types for the pitch and duration vocabularies.
//!
//! Tokens are the opaque strings the training phase extracted from the
//! corpus. A pitch token is a single note name (`"E-5"`) or a dot-delimited
//! chord (`"C4.E4.G4"`); a duration token is a decimal (`"0.5"`) or a
//! fraction (`"1/3"`) in quarter-note lengths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A symbol from the pitch vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchToken(String);

impl PitchToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the token denotes a chord.
    pub fn is_chord(&self) -> bool {
        self.0.contains('.')
    }
}

impl fmt::Display for PitchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A symbol from the duration vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationToken(String);

impl DurationToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DurationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (pitch, duration) pair produced by a generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEvent {
    pub pitch: PitchToken,
    pub duration: DurationToken,
}

impl GeneratedEvent {
    /// Creates an event from raw token strings.
    pub fn new(pitch: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            pitch: PitchToken::new(pitch),
            duration: DurationToken::new(duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_detection() {
        assert!(PitchToken::new("C4.E4.G4").is_chord());
        assert!(!PitchToken::new("C#4").is_chord());
    }


    #[test]
    fn tokens_serialize_as_plain_strings() {
        let event = GeneratedEvent::new("A4", "1/3");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"pitch":"A4","duration":"1/3"}"#);
    }
}
