//! Core types for songsmith.
//!
//! - [`PitchToken`] / [`DurationToken`]: vocabulary symbols
//! - [`GeneratedEvent`]: one (pitch, duration) pair from the generation loop
//! - [`ScorerConfig`]: topology of the exported scorer
//! - [`GeneratedPiece`]: summary of a rendered piece

mod piece;
mod scorer_config;
mod token;

pub use piece::{compute_piece_id, GeneratedPiece};
pub use scorer_config::ScorerConfig;
pub use token::{DurationToken, GeneratedEvent, PitchToken};
