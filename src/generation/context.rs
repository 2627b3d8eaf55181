//! Shared, read-only state for generation requests.

use std::sync::Arc;

use tracing::info;

use crate::config::SongsmithConfig;
use crate::error::{Result, SongsmithError};
use crate::models::{load_scorer, Scorer};
use crate::vocab::VocabularyStore;

/// Scorer and vocabulary store shared by every generation.
///
/// Cloning is cheap; clones point at the same loaded artifacts.
#[derive(Clone)]
pub struct GenerationContext {
    scorer: Arc<dyn Scorer>,
    vocab: Arc<VocabularyStore>,
}

impl std::fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationContext")
            .field("pitch_vocab", &self.vocab.pitch().len())
            .field("duration_vocab", &self.vocab.duration().len())
            .field("seed_pairs", &self.vocab.seed_pool().len())
            .finish_non_exhaustive()
    }
}

impl GenerationContext {
    /// Builds a context from already-loaded parts.
    ///
    /// Fails with ARTIFACT_LOAD_FAILED when the scorer heads do not match
    /// the vocabulary sizes, since sampled indices would then not resolve.
    pub fn new(scorer: Arc<dyn Scorer>, vocab: Arc<VocabularyStore>) -> Result<Self> {
        if scorer.pitch_vocab_size() != vocab.pitch().len() {
            return Err(SongsmithError::artifact_load_failed(format!(
                "pitch head has {} outputs but the vocabulary has {} tokens",
                scorer.pitch_vocab_size(),
                vocab.pitch().len()
            )));
        }

        if scorer.duration_vocab_size() != vocab.duration().len() {
            return Err(SongsmithError::artifact_load_failed(format!(
                "duration head has {} outputs but the vocabulary has {} tokens",
                scorer.duration_vocab_size(),
                vocab.duration().len()
            )));
        }

        Ok(Self { scorer, vocab })
    }

    /// Loads the vocabulary artifact and the ONNX scorer named by the config.
    pub fn load(config: &SongsmithConfig) -> Result<Self> {
        let vocab = VocabularyStore::load(&config.effective_vocab_path())?;
        let scorer = load_scorer(&config.effective_model_path(), config.device, config.threads)?;

        if let Some(reason) = scorer
            .config()
            .check_vocab_sizes(vocab.pitch().len(), vocab.duration().len())
        {
            return Err(SongsmithError::artifact_load_failed(reason));
        }

        info!(
            device = scorer.device_name(),
            seed_pairs = vocab.seed_pool().len(),
            dropped_pairs = vocab.seed_pool().dropped(),
            "generation context ready"
        );

        Self::new(Arc::new(scorer), Arc::new(vocab))
    }

    /// The shared scorer.
    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// The shared vocabulary store.
    pub fn vocab(&self) -> &VocabularyStore {
        &self.vocab
    }
}
