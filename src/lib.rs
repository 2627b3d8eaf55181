//! songsmith: autoregressive piano music generation.
//!
//! A trained dual-embedding sequence model scores the next pitch and
//! duration tokens given a rolling window of previous ones. The generation
//! loop samples from those scores with temperature and nucleus filtering,
//! and the renderer turns the resulting token stream into a MIDI file.
//!
//! # Modules
//!
//! - [`types`]: Core data types (tokens, events, GeneratedPiece, ScorerConfig)
//! - [`config`]: Runtime configuration (SongsmithConfig, GenerationConfig, Device)
//! - [`error`]: Error types and codes (SongsmithError, ErrorCode)
//! - [`vocab`]: Vocabularies and the seed pool
//! - [`models`]: Scorer trait, ONNX backend, logits and nucleus sampling
//! - [`generation`]: Window, context and the generation loop
//! - [`render`]: Notation parsing and MIDI output
//! - [`handler`]: Request handler contract
//!
//! # Example
//!
//! ```rust,ignore
//! use songsmith::{
//!     config::SongsmithConfig,
//!     generation::{compose_to_file, CancelFlag, GenerationContext},
//! };
//!
//! let config = SongsmithConfig::from_env();
//! let ctx = GenerationContext::load(&config)?;
//! let piece = compose_to_file(
//!     &ctx,
//!     &config.generation,
//!     &config.effective_output_path(),
//!     &CancelFlag::new(),
//! )?;
//! println!("wrote {} events to {}", piece.num_events, piece.path.display());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod handler;
pub mod models;
pub mod render;
pub mod types;
pub mod vocab;

// Re-export commonly used types at crate root for convenience
pub use config::{Device, GenerationConfig, SongsmithConfig};
pub use error::{ErrorCode, Result, SongsmithError};
pub use types::{compute_piece_id, GeneratedEvent, GeneratedPiece, ScorerConfig};
