//! Scorer interface.
//!
//! The generation loop only sees this trait: two index windows in, one
//! logits vector per head out. Backends hold read-only parameters, so one
//! scorer can be shared by concurrent generations.

use crate::error::Result;

use super::logits::Logits;

/// Logits for the token following the current windows.
#[derive(Debug, Clone)]
pub struct ScorerOutput {
    /// Logits over the pitch vocabulary.
    pub pitch: Logits,
    /// Logits over the duration vocabulary.
    pub duration: Logits,
}

/// A trained sequence model evaluated in inference-only mode.
pub trait Scorer: Send + Sync {
    /// Scores the next token for one pair of windows.
    ///
    /// Both windows have the same length and positional correspondence.
    fn evaluate(&self, pitch_window: &[usize], duration_window: &[usize]) -> Result<ScorerOutput>;

    /// Width of the pitch head.
    fn pitch_vocab_size(&self) -> usize;

    /// Width of the duration head.
    fn duration_vocab_size(&self) -> usize;
}
