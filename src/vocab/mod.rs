//! Vocabulary store.
//!
//! Bidirectional token/index mappings for the pitch and duration
//! vocabularies, plus the historical token sequences used to seed
//! generation. Loaded once from the training phase's artifact and read-only
//! afterwards.

pub mod store;
pub mod vocabulary;

pub use store::{SeedPool, VocabularyArtifact, VocabularyStore};
pub use vocabulary::Vocabulary;
