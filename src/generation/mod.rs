//! Music generation module.
//!
//! Provides the sequence window, the shared generation context and the
//! autoregressive generation loop.

pub mod context;
pub mod pipeline;
pub mod window;

// Re-export commonly used items
pub use context::GenerationContext;
pub use pipeline::{
    compose, compose_to_file, generate, generate_with_progress, CancelFlag, Composition,
    GenerationParams,
};
pub use window::SequenceWindow;
