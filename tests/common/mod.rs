//! Shared fixtures: a small vocabulary and deterministic in-memory scorers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use songsmith::generation::GenerationContext;
use songsmith::models::{Logits, Scorer, ScorerOutput};
use songsmith::vocab::{SeedPool, Vocabulary, VocabularyStore};
use songsmith::{Result, SongsmithError};

pub const PITCH_TOKENS: [&str; 8] = ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C4.E4.G4"];
pub const DURATION_TOKENS: [&str; 4] = ["0.5", "1.0", "1/3", "2.0"];

/// How the scorer shapes its logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Strongly favours the index after the newest one in each window.
    Successor,
    /// All logits equal.
    Flat,
    /// Index 0 gets logit 1, every other index 0, on both heads.
    LeadingOne,
}

/// Scorer that records every window it is given.
pub struct RecordingScorer {
    mode: Mode,
    n_pitch: usize,
    n_dur: usize,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    windows: Mutex<Vec<(Vec<usize>, Vec<usize>)>>,
}

impl RecordingScorer {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            n_pitch: PITCH_TOKENS.len(),
            n_dur: DURATION_TOKENS.len(),
            fail_on_call: None,
            calls: AtomicUsize::new(0),
            windows: Mutex::new(Vec::new()),
        }
    }

    /// Fails the `call`-th evaluation (zero-based).
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn with_sizes(mut self, n_pitch: usize, n_dur: usize) -> Self {
        self.n_pitch = n_pitch;
        self.n_dur = n_dur;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<(Vec<usize>, Vec<usize>)> {
        self.windows.lock().unwrap().clone()
    }

    fn head(&self, width: usize, newest: Option<usize>) -> Logits {
        match self.mode {
            Mode::Flat => Logits::from(vec![0.0; width]),
            Mode::LeadingOne => {
                let mut values = vec![0.0; width];
                values[0] = 1.0;
                Logits::from(values)
            }
            Mode::Successor => {
                let mut values = vec![0.0; width];
                let next = newest.map_or(0, |i| (i + 1) % width);
                values[next] = 12.0;
                Logits::from(values)
            }
        }
    }
}

impl Scorer for RecordingScorer {
    fn evaluate(&self, pitch_window: &[usize], duration_window: &[usize]) -> Result<ScorerOutput> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows
            .lock()
            .unwrap()
            .push((pitch_window.to_vec(), duration_window.to_vec()));

        if self.fail_on_call == Some(call) {
            return Err(SongsmithError::scorer_invocation_failed("device lost"));
        }

        Ok(ScorerOutput {
            pitch: self.head(self.n_pitch, pitch_window.last().copied()),
            duration: self.head(self.n_dur, duration_window.last().copied()),
        })
    }

    fn pitch_vocab_size(&self) -> usize {
        self.n_pitch
    }

    fn duration_vocab_size(&self) -> usize {
        self.n_dur
    }
}

pub fn vocabularies() -> (Vocabulary, Vocabulary) {
    (
        Vocabulary::from_tokens(PITCH_TOKENS).unwrap(),
        Vocabulary::from_tokens(DURATION_TOKENS).unwrap(),
    )
}

/// A store whose seed pool cycles through both vocabularies.
pub fn store_with_history(pairs: usize) -> VocabularyStore {
    let (pitch, duration) = vocabularies();
    let pool = SeedPool::from_indices(
        (0..pairs).map(|i| i % PITCH_TOKENS.len()).collect(),
        (0..pairs).map(|i| i % DURATION_TOKENS.len()).collect(),
    );
    VocabularyStore::with_seed_pool(pitch, duration, pool)
}

pub fn context(scorer: Arc<RecordingScorer>, pairs: usize) -> GenerationContext {
    GenerationContext::new(scorer, Arc::new(store_with_history(pairs))).unwrap()
}
