//! GeneratedPiece type summarizing one finished generation.
//!
//! A GeneratedPiece records where a rendered MIDI file was written and how
//! it was produced. Pieces are identified by a deterministic piece_id
//! computed from the generation parameters.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::config::GenerationConfig;

/// Summary of a generated and rendered piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPiece {
    /// SHA256 hash of the generation parameters, 16 hex characters.
    pub piece_id: String,

    /// Where the MIDI file was written.
    pub path: PathBuf,

    /// Number of events the generation loop produced.
    pub num_events: usize,

    /// Events that became notes or chords.
    pub rendered: usize,

    /// Events skipped because a token did not parse.
    pub skipped: usize,

    /// Seed the generation RNG was built from.
    pub seed: u64,

    /// Time spent generating and rendering, in seconds.
    pub generation_time_sec: f32,

    /// When the piece was created (Unix timestamp).
    #[serde(with = "system_time_serde")]
    pub created_at: SystemTime,
}

impl GeneratedPiece {
    /// Creates a new GeneratedPiece, computing its piece_id.
    pub fn new(
        path: PathBuf,
        generation: &GenerationConfig,
        seed: u64,
        rendered: usize,
        skipped: usize,
        generation_time_sec: f32,
    ) -> Self {
        Self {
            piece_id: compute_piece_id(generation, seed),
            path,
            num_events: rendered + skipped,
            rendered,
            skipped,
            seed,
            generation_time_sec,
            created_at: SystemTime::now(),
        }
    }
}

/// Computes a deterministic piece ID from generation parameters.
///
/// The ID is the first 16 hex characters of the SHA256 hash of
/// `{num_notes}:{temperature_pitch}:{temperature_duration}:{top_p}:{sequence_length}:{seed}`,
/// so identical parameters and seed always give the same ID.
pub fn compute_piece_id(generation: &GenerationConfig, seed: u64) -> String {
    let input = format!(
        "{}:{}:{}:{}:{}:{}",
        generation.num_notes,
        generation.temperature_pitch,
        generation.temperature_duration,
        generation.top_p,
        generation.sequence_length,
        seed
    );
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        secs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_id_deterministic() {
        let generation = GenerationConfig::default();
        let id1 = compute_piece_id(&generation, 42);
        let id2 = compute_piece_id(&generation, 42);
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 16);
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn piece_id_varies_with_params() {
        let generation = GenerationConfig::default();
        let mut hotter = generation.clone();
        hotter.temperature_pitch = 1.2;

        assert_ne!(
            compute_piece_id(&generation, 42),
            compute_piece_id(&generation, 43)
        );
        assert_ne!(
            compute_piece_id(&generation, 42),
            compute_piece_id(&hotter, 42)
        );
    }

    #[test]
    fn counts_add_up() {
        let piece = GeneratedPiece::new(
            PathBuf::from("/tmp/out.mid"),
            &GenerationConfig::default(),
            7,
            60,
            4,
            1.5,
        );
        assert_eq!(piece.num_events, 64);
        assert_eq!(piece.skipped, 4);
    }
}
