//! Error types for songsmith.
//!
//! Defines the error codes and the error type used throughout the crate
//! for consistent error handling and reporting.

use std::fmt;

/// Error codes carried by every [`SongsmithError`].
///
/// These codes let callers (the CLI, the request handler) react to specific
/// failure classes without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Vocabulary or scorer artifact not found at the expected path.
    /// Trigger: training phase never ran, or a wrong path was configured.
    ArtifactNotFound,

    /// Artifact exists but could not be loaded.
    /// Trigger: corrupt file, wrong schema, vocabulary/scorer size mismatch.
    ArtifactLoadFailed,

    /// Seed pool shorter than the required window.
    /// Trigger: fewer than `sequence_length + 1` resolvable history pairs.
    InsufficientHistory,

    /// Scorer inference failed during a generation step.
    /// Trigger: runtime error, wrong tensor shape or dtype from the model.
    ScorerInvocationFailed,

    /// Nucleus sampling could not draw an index.
    /// Trigger: empty or non-finite logits.
    SamplingFailed,

    /// A sampled index has no token in the vocabulary.
    /// Trigger: scorer head wider than the vocabulary.
    TokenResolutionFailed,

    /// The rendered MIDI file could not be written.
    /// Trigger: unwritable path, missing parent directory, disk full.
    RenderWriteFailed,

    /// A generation parameter is out of range.
    /// Trigger: non-positive temperature or threshold, zero sequence length.
    InvalidParameter,

    /// Generation stopped before completion.
    /// Trigger: cancel flag raised or time budget exhausted.
    GenerationCancelled,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ArtifactNotFound => "ARTIFACT_NOT_FOUND",
            ErrorCode::ArtifactLoadFailed => "ARTIFACT_LOAD_FAILED",
            ErrorCode::InsufficientHistory => "INSUFFICIENT_HISTORY",
            ErrorCode::ScorerInvocationFailed => "SCORER_INVOCATION_FAILED",
            ErrorCode::SamplingFailed => "SAMPLING_FAILED",
            ErrorCode::TokenResolutionFailed => "TOKEN_RESOLUTION_FAILED",
            ErrorCode::RenderWriteFailed => "RENDER_WRITE_FAILED",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::GenerationCancelled => "GENERATION_CANCELLED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ArtifactNotFound => "Vocabulary or scorer artifact not found",
            ErrorCode::ArtifactLoadFailed => "Failed to load vocabulary or scorer artifact",
            ErrorCode::InsufficientHistory => "Not enough history to seed the sequence window",
            ErrorCode::ScorerInvocationFailed => "Scorer inference failed during generation",
            ErrorCode::SamplingFailed => "Failed to sample from the scorer output",
            ErrorCode::TokenResolutionFailed => "Sampled index has no vocabulary entry",
            ErrorCode::RenderWriteFailed => "Failed to write the rendered MIDI file",
            ErrorCode::InvalidParameter => "Generation parameter out of range",
            ErrorCode::GenerationCancelled => "Generation was cancelled before completion",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::ArtifactNotFound => {
                "Run the training phase first, or point --vocab / --model-dir \
                 (SONGSMITH_VOCAB_PATH / SONGSMITH_MODEL_PATH) at existing artifacts"
            }
            ErrorCode::ArtifactLoadFailed => {
                "Re-export the vocabulary and scorer from the same training run, \
                 and check that scorer.json matches the vocabulary sizes"
            }
            ErrorCode::InsufficientHistory => {
                "Lower the sequence length or export a longer history with the vocabulary"
            }
            ErrorCode::ScorerInvocationFailed => {
                "Check that scorer.onnx takes pitch_ids/duration_ids and returns \
                 pitch_logits/duration_logits, or retry with SONGSMITH_DEVICE=cpu"
            }
            ErrorCode::SamplingFailed => {
                "Use a finite positive temperature and a top_p greater than 0"
            }
            ErrorCode::TokenResolutionFailed => {
                "Re-export the vocabulary so it covers every output of the scorer heads"
            }
            ErrorCode::RenderWriteFailed => {
                "Check that the output directory exists and is writable"
            }
            ErrorCode::InvalidParameter => {
                "Use temperatures > 0, 0 < top_p, and a sequence length > 0"
            }
            ErrorCode::GenerationCancelled => {
                "Raise timeout_sec or request fewer notes"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for songsmith operations.
#[derive(Debug)]
pub struct SongsmithError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SongsmithError {
    /// Creates a new SongsmithError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new SongsmithError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an ARTIFACT_NOT_FOUND error.
    pub fn artifact_not_found(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ArtifactNotFound,
            format!("Artifact not found at: {}", path.into()),
        )
    }

    /// Creates an ARTIFACT_LOAD_FAILED error.
    pub fn artifact_load_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ArtifactLoadFailed,
            format!("Failed to load artifact: {}", reason.into()),
        )
    }

    /// Creates an INSUFFICIENT_HISTORY error.
    pub fn insufficient_history(available: usize, required: usize) -> Self {
        Self::new(
            ErrorCode::InsufficientHistory,
            format!(
                "History has {} usable pairs, at least {} required",
                available, required
            ),
        )
    }

    /// Creates a SCORER_INVOCATION_FAILED error.
    pub fn scorer_invocation_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ScorerInvocationFailed,
            format!("Scorer inference failed: {}", reason.into()),
        )
    }

    /// Creates a SAMPLING_FAILED error.
    pub fn sampling_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SamplingFailed,
            format!("Sampling failed: {}", reason.into()),
        )
    }

    /// Creates a TOKEN_RESOLUTION_FAILED error.
    pub fn token_resolution_failed(vocabulary: &str, index: usize) -> Self {
        Self::new(
            ErrorCode::TokenResolutionFailed,
            format!("Index {} has no entry in the {} vocabulary", index, vocabulary),
        )
    }

    /// Creates a RENDER_WRITE_FAILED error.
    pub fn render_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::RenderWriteFailed,
            format!("Failed to write MIDI file to {}", path.into()),
            source,
        )
    }

    /// Creates an INVALID_PARAMETER error.
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, reason)
    }

    /// Creates a GENERATION_CANCELLED error.
    pub fn generation_cancelled(step: usize, total: usize) -> Self {
        Self::new(
            ErrorCode::GenerationCancelled,
            format!("Generation cancelled at step {} of {}", step, total),
        )
    }
}

impl fmt::Display for SongsmithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for SongsmithError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using SongsmithError.
pub type Result<T> = std::result::Result<T, SongsmithError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::ArtifactNotFound.as_str(), "ARTIFACT_NOT_FOUND");
        assert_eq!(ErrorCode::ArtifactLoadFailed.as_str(), "ARTIFACT_LOAD_FAILED");
        assert_eq!(ErrorCode::InsufficientHistory.as_str(), "INSUFFICIENT_HISTORY");
        assert_eq!(
            ErrorCode::ScorerInvocationFailed.as_str(),
            "SCORER_INVOCATION_FAILED"
        );
        assert_eq!(ErrorCode::RenderWriteFailed.as_str(), "RENDER_WRITE_FAILED");
        assert_eq!(ErrorCode::GenerationCancelled.as_str(), "GENERATION_CANCELLED");
    }

    #[test]
    fn error_code_recovery_hints_not_empty() {
        let codes = [
            ErrorCode::ArtifactNotFound,
            ErrorCode::ArtifactLoadFailed,
            ErrorCode::InsufficientHistory,
            ErrorCode::ScorerInvocationFailed,
            ErrorCode::SamplingFailed,
            ErrorCode::TokenResolutionFailed,
            ErrorCode::RenderWriteFailed,
            ErrorCode::InvalidParameter,
            ErrorCode::GenerationCancelled,
        ];
        for code in codes {
            assert!(!code.recovery_hint().is_empty(), "{} has no hint", code);
            assert!(!code.description().is_empty(), "{} has no description", code);
        }
    }

    #[test]
    fn artifact_not_found_mentions_path() {
        let err = SongsmithError::artifact_not_found("/data/processed_midi.json");
        let text = err.to_string();
        assert!(text.contains("ARTIFACT_NOT_FOUND"));
        assert!(text.contains("/data/processed_midi.json"));
        assert!(text.contains("Recovery:"));
    }

    #[test]
    fn render_write_failed_keeps_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SongsmithError::render_write_failed("/root/out.mid", io);
        assert_eq!(err.code, ErrorCode::RenderWriteFailed);
        assert!(err.source().is_some());
    }
}
