//! Vocabulary store loader.
//!
//! Reads the training phase's vocabulary/history artifact and builds the
//! seed pool the generation loop slices its starting window from.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SongsmithError};

use super::vocabulary::Vocabulary;

/// On-disk layout of the vocabulary/history artifact (JSON).
///
/// Integer map keys are written as JSON strings (`{"0": "C4"}`), which is
/// what a Python `json.dump` of an int-keyed dict produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyArtifact {
    pub pitch_to_int: HashMap<String, usize>,
    pub int_to_pitch: HashMap<usize, String>,
    pub dur_to_int: HashMap<String, usize>,
    pub int_to_dur: HashMap<usize, String>,
    /// Pitch tokens of the training corpus, in order.
    pub pitches: Vec<String>,
    /// Duration tokens of the training corpus, parallel to `pitches`.
    pub durs: Vec<String>,
}

/// Historical index sequences the starting window is sliced from.
///
/// Both sequences always have the same length and positional
/// correspondence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPool {
    pitch: Vec<usize>,
    duration: Vec<usize>,
    /// History pairs dropped because a token had no index.
    dropped: usize,
}

impl SeedPool {
    /// Creates a pool from already-resolved index sequences.
    ///
    /// Sequences of different length are truncated to the shorter one.
    pub fn from_indices(mut pitch: Vec<usize>, mut duration: Vec<usize>) -> Self {
        let len = pitch.len().min(duration.len());
        pitch.truncate(len);
        duration.truncate(len);
        Self {
            pitch,
            duration,
            dropped: 0,
        }
    }

    /// Pitch index history.
    pub fn pitch(&self) -> &[usize] {
        &self.pitch
    }

    /// Duration index history.
    pub fn duration(&self) -> &[usize] {
        &self.duration
    }

    /// Number of usable history pairs.
    pub fn len(&self) -> usize {
        self.pitch.len()
    }

    /// Returns true if the pool holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pitch.is_empty()
    }

    /// Number of history pairs dropped while resolving tokens.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Loaded vocabularies and seed pool, shared read-only by all generations.
#[derive(Debug, Clone)]
pub struct VocabularyStore {
    pitch: Vocabulary,
    duration: Vocabulary,
    seed_pool: SeedPool,
}

impl VocabularyStore {
    /// Loads the store from a JSON artifact.
    ///
    /// Fails with ARTIFACT_NOT_FOUND if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SongsmithError::artifact_not_found(
                path.display().to_string(),
            ));
        }

        info!(path = %path.display(), "loading vocabulary");

        let content = std::fs::read_to_string(path).map_err(|e| {
            SongsmithError::artifact_load_failed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        let artifact: VocabularyArtifact = serde_json::from_str(&content).map_err(|e| {
            SongsmithError::artifact_load_failed(format!(
                "Failed to parse {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_artifact(artifact)
    }

    /// Builds the store from a parsed artifact.
    pub fn from_artifact(artifact: VocabularyArtifact) -> Result<Self> {
        let pitch = Vocabulary::from_mappings("pitch", artifact.pitch_to_int, artifact.int_to_pitch)?;
        let duration =
            Vocabulary::from_mappings("duration", artifact.dur_to_int, artifact.int_to_dur)?;

        let store = Self::from_history(pitch, duration, &artifact.pitches, &artifact.durs);

        info!(
            pitch_tokens = store.pitch.len(),
            duration_tokens = store.duration.len(),
            seed_pairs = store.seed_pool.len(),
            "vocabulary loaded"
        );

        Ok(store)
    }

    /// Builds the store from vocabularies and raw history tokens.
    ///
    /// A history pair is kept only when both of its tokens resolve, so the
    /// pitch and duration pools stay in lockstep.
    pub fn from_history<P, D>(
        pitch: Vocabulary,
        duration: Vocabulary,
        pitches: &[P],
        durations: &[D],
    ) -> Self
    where
        P: AsRef<str>,
        D: AsRef<str>,
    {
        if pitches.len() != durations.len() {
            warn!(
                pitches = pitches.len(),
                durations = durations.len(),
                "history sequences differ in length, extra tokens ignored"
            );
        }

        let mut pool = SeedPool::default();
        for (p, d) in pitches.iter().zip(durations) {
            match (pitch.index_of(p.as_ref()), duration.index_of(d.as_ref())) {
                (Some(pi), Some(di)) => {
                    pool.pitch.push(pi);
                    pool.duration.push(di);
                }
                _ => pool.dropped += 1,
            }
        }

        if pool.dropped > 0 {
            warn!(
                dropped = pool.dropped,
                "history pairs with tokens outside the vocabulary dropped from the seed pool"
            );
        }

        Self {
            pitch,
            duration,
            seed_pool: pool,
        }
    }

    /// Builds the store from vocabularies and an already-resolved pool.
    pub fn with_seed_pool(pitch: Vocabulary, duration: Vocabulary, seed_pool: SeedPool) -> Self {
        Self {
            pitch,
            duration,
            seed_pool,
        }
    }

    /// Pitch vocabulary.
    pub fn pitch(&self) -> &Vocabulary {
        &self.pitch
    }

    /// Duration vocabulary.
    pub fn duration(&self) -> &Vocabulary {
        &self.duration
    }

    /// Seed pool for starting windows.
    pub fn seed_pool(&self) -> &SeedPool {
        &self.seed_pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vocabularies() -> (Vocabulary, Vocabulary) {
        (
            Vocabulary::from_tokens(["C4", "E4", "G4", "C4.E4.G4"]).unwrap(),
            Vocabulary::from_tokens(["0.5", "1.0", "1/3"]).unwrap(),
        )
    }

    #[test]
    fn seed_pool_drops_unknown_pairs_together() {
        let (pitch, duration) = vocabularies();
        let store = VocabularyStore::from_history(
            pitch,
            duration,
            &["C4", "Z9", "E4", "G4"],
            &["0.5", "1.0", "2.75", "1/3"],
        );

        let pool = store.seed_pool();
        assert_eq!(pool.pitch(), &[0, 2]);
        assert_eq!(pool.duration(), &[0, 2]);
        assert_eq!(pool.dropped(), 2);
    }

    #[test]
    fn seed_pool_truncates_uneven_history() {
        let (pitch, duration) = vocabularies();
        let store = VocabularyStore::from_history(pitch, duration, &["C4", "E4", "G4"], &["0.5"]);
        assert_eq!(store.seed_pool().len(), 1);
    }

    #[test]
    fn load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_midi.json");
        let err = VocabularyStore::load(&path).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ArtifactNotFound);
        assert!(err.message.contains("processed_midi.json"));
    }

    #[test]
    fn load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "pitch_to_int": {{"C4": 0, "E4.G4": 1}},
                "int_to_pitch": {{"0": "C4", "1": "E4.G4"}},
                "dur_to_int": {{"0.5": 0, "1/3": 1}},
                "int_to_dur": {{"0": "0.5", "1": "1/3"}},
                "pitches": ["C4", "E4.G4", "C4"],
                "durs": ["1/3", "0.5", "0.5"]
            }}"#
        )
        .unwrap();

        let store = VocabularyStore::load(file.path()).unwrap();
        assert_eq!(store.pitch().len(), 2);
        assert_eq!(store.duration().token_at(1), Some("1/3"));
        assert_eq!(store.seed_pool().pitch(), &[0, 1, 0]);
        assert_eq!(store.seed_pool().duration(), &[1, 0, 0]);
    }

    #[test]
    fn load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = VocabularyStore::load(file.path()).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ArtifactLoadFailed);
    }
}
