//! ScorerConfig type for the dual-embedding LSTM topology.
//!
//! Mirrors the hyperparameters the training phase used to build the scorer:
//! two embedding tables feeding one recurrent stack, with one linear head per
//! vocabulary.

use serde::{Deserialize, Serialize};

/// Topology of the exported scorer.
///
/// Read from `scorer.json` next to `scorer.onnx`. The head widths must match
/// the vocabulary sizes, otherwise sampled indices could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Pitch vocabulary size (width of the pitch head).
    pub n_pitch: u32,

    /// Duration vocabulary size (width of the duration head).
    pub n_dur: u32,

    /// Pitch embedding dimension.
    pub embed_pitch: u32,

    /// Duration embedding dimension.
    pub embed_dur: u32,

    /// LSTM hidden size shared by both heads.
    pub hidden_size: u32,

    /// Number of stacked LSTM layers.
    pub num_layers: u32,

    /// Window length the scorer was trained on.
    pub sequence_length: u32,
}

impl ScorerConfig {
    /// Validates the configuration for consistency.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.n_pitch == 0 {
            return Some("n_pitch must be > 0".to_string());
        }

        if self.n_dur == 0 {
            return Some("n_dur must be > 0".to_string());
        }

        if self.embed_pitch == 0 || self.embed_dur == 0 {
            return Some("embedding dimensions must be > 0".to_string());
        }

        if self.hidden_size == 0 {
            return Some("hidden_size must be > 0".to_string());
        }

        if self.num_layers == 0 {
            return Some("num_layers must be > 0".to_string());
        }

        if self.sequence_length == 0 {
            return Some("sequence_length must be > 0".to_string());
        }

        None
    }

    /// Returns the LSTM input width (both embeddings concatenated).
    pub fn lstm_input_size(&self) -> u32 {
        self.embed_pitch + self.embed_dur
    }

    /// Checks that the head widths match the loaded vocabularies.
    pub fn check_vocab_sizes(&self, n_pitch: usize, n_dur: usize) -> Option<String> {
        if self.n_pitch as usize != n_pitch {
            return Some(format!(
                "pitch head has {} outputs but the vocabulary has {} tokens",
                self.n_pitch, n_pitch
            ));
        }

        if self.n_dur as usize != n_dur {
            return Some(format!(
                "duration head has {} outputs but the vocabulary has {} tokens",
                self.n_dur, n_dur
            ));
        }

        None
    }
}
