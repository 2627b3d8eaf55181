//! Request handler contract.
//!
//! Transport-agnostic: a web layer (or the CLI) maps a [`HandlerResponse`]
//! onto its own response type. A successful generation answers with the
//! MIDI bytes as an attachment; every failure becomes status 500 carrying
//! the error's string form.

use std::path::Path;

use tracing::error;

use crate::config::GenerationConfig;
use crate::error::{Result, SongsmithError};
use crate::generation::{compose, CancelFlag, GenerationContext};
use crate::render::{write_midi_bytes, write_midi_to_buffer};

/// File name offered to clients for the generated piece.
pub const ATTACHMENT_NAME: &str = "generated_song.mid";

/// Content type of a successful response.
pub const MIDI_CONTENT_TYPE: &str = "audio/midi";

/// Content type of an error response.
pub const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub const STATUS_OK: u16 = 200;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Response to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub content_type: &'static str,
    /// Set only on success.
    pub attachment_name: Option<&'static str>,
    pub body: Vec<u8>,
}

impl HandlerResponse {
    /// A successful MIDI attachment.
    pub fn midi(body: Vec<u8>) -> Self {
        Self {
            status: STATUS_OK,
            content_type: MIDI_CONTENT_TYPE,
            attachment_name: Some(ATTACHMENT_NAME),
            body,
        }
    }

    /// A 500 response carrying the error's string form.
    pub fn from_error(err: &SongsmithError) -> Self {
        Self {
            status: STATUS_INTERNAL_ERROR,
            content_type: ERROR_CONTENT_TYPE,
            attachment_name: None,
            body: err.to_string().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Handles one generation request.
///
/// Generates with `generation`, overwrites the MIDI file at `output_path`
/// and returns the same bytes as an attachment.
pub fn handle_generate(
    ctx: &GenerationContext,
    generation: &GenerationConfig,
    output_path: &Path,
    cancel: &CancelFlag,
) -> HandlerResponse {
    match generate_midi(ctx, generation, output_path, cancel) {
        Ok(bytes) => HandlerResponse::midi(bytes),
        Err(err) => {
            error!(code = %err.code, "generation request failed: {}", err.message);
            HandlerResponse::from_error(&err)
        }
    }
}

fn generate_midi(
    ctx: &GenerationContext,
    generation: &GenerationConfig,
    output_path: &Path,
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    if let Some(reason) = generation.validate() {
        return Err(SongsmithError::invalid_parameter(reason));
    }

    let composition = compose(ctx, generation, cancel)?;
    let bytes = write_midi_to_buffer(&composition.score)?;
    write_midi_bytes(&bytes, output_path)?;

    Ok(bytes)
}
