//! Scorer components.
//!
//! - [`Scorer`](scorer::Scorer): the narrow interface the generation loop uses
//! - [`OnnxScorer`](onnx::OnnxScorer): dual-embedding LSTM on ONNX Runtime
//! - [`Logits`](logits::Logits): temperature scaling and nucleus sampling
//! - [`loader`]: artifact checks and device selection

pub mod loader;
pub mod logits;
pub mod onnx;
pub mod scorer;

// Re-export commonly used types
pub use loader::{
    check_models, execution_providers, load_scorer, load_scorer_config, REQUIRED_MODEL_FILES,
};
pub use logits::{nucleus_filter, Logits, DEFAULT_TOP_P};
pub use onnx::OnnxScorer;
pub use scorer::{Scorer, ScorerOutput};
