//! ONNX-backed scorer.
//!
//! Wraps the exported dual-embedding LSTM. The graph takes
//! `pitch_ids` and `duration_ids` (int64, `[1, seq_len]`) and returns
//! `pitch_logits` and `duration_logits` (`[1, n_pitch]` / `[1, n_dur]`).

use std::borrow::Cow;
use std::path::Path;
use std::sync::Mutex;

use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;

use crate::error::{Result, SongsmithError};
use crate::types::ScorerConfig;

use super::logits::Logits;
use super::scorer::{Scorer, ScorerOutput};

/// Input name for the pitch window.
pub const PITCH_INPUT: &str = "pitch_ids";
/// Input name for the duration window.
pub const DURATION_INPUT: &str = "duration_ids";
/// Output name for the pitch head.
pub const PITCH_OUTPUT: &str = "pitch_logits";
/// Output name for the duration head.
pub const DURATION_OUTPUT: &str = "duration_logits";

/// Dual-head LSTM scorer running on ONNX Runtime.
pub struct OnnxScorer {
    /// Running a session needs exclusive access; the lock lets `evaluate`
    /// take `&self` so the scorer can be shared.
    session: Mutex<Session>,
    config: ScorerConfig,
    device_name: String,
}

impl std::fmt::Debug for OnnxScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxScorer")
            .field("config", &self.config)
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}

impl OnnxScorer {
    /// Loads `scorer.onnx` with the given topology.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX file
    /// * `config` - Topology read from `scorer.json`
    /// * `providers` - Execution providers for ONNX Runtime
    /// * `threads` - Intra-op thread count, or None for the runtime default
    pub fn load(
        model_path: &Path,
        config: ScorerConfig,
        providers: &[ExecutionProviderDispatch],
        threads: Option<u32>,
        device_name: impl Into<String>,
    ) -> Result<Self> {
        let mut builder = Session::builder().map_err(|e| {
            SongsmithError::artifact_load_failed(format!("Failed to create session: {}", e))
        })?;

        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers).map_err(|e| {
                SongsmithError::artifact_load_failed(format!(
                    "Failed to set execution providers: {}",
                    e
                ))
            })?;
        }

        if let Some(threads) = threads {
            builder = builder.with_intra_threads(threads as usize).map_err(|e| {
                SongsmithError::artifact_load_failed(format!("Failed to set threads: {}", e))
            })?;
        }

        let session = builder.commit_from_file(model_path).map_err(|e| {
            SongsmithError::artifact_load_failed(format!(
                "Failed to load {}: {}",
                model_path.display(),
                e
            ))
        })?;

        Ok(Self {
            session: Mutex::new(session),
            config,
            device_name: device_name.into(),
        })
    }

    /// Returns the topology this scorer was loaded with.
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Returns the device name used for inference.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Scorer for OnnxScorer {
    fn evaluate(&self, pitch_window: &[usize], duration_window: &[usize]) -> Result<ScorerOutput> {
        if pitch_window.len() != duration_window.len() {
            return Err(SongsmithError::scorer_invocation_failed(format!(
                "window lengths differ: {} pitch vs {} duration",
                pitch_window.len(),
                duration_window.len()
            )));
        }

        let seq_len = pitch_window.len();
        let pitch_ids = window_tensor(pitch_window)?;
        let duration_ids = window_tensor(duration_window)?;

        let session_inputs: Vec<(Cow<str>, SessionInputValue)> = vec![
            (Cow::from(PITCH_INPUT), SessionInputValue::from(pitch_ids.view())),
            (Cow::from(DURATION_INPUT), SessionInputValue::from(duration_ids.view())),
        ];

        let mut session = self.session.lock().map_err(|_| {
            SongsmithError::scorer_invocation_failed("scorer session lock poisoned")
        })?;

        let mut outputs = session.run(session_inputs).map_err(|e| {
            SongsmithError::scorer_invocation_failed(format!(
                "Inference over a window of {} failed: {}",
                seq_len, e
            ))
        })?;

        let pitch_value = outputs.remove(PITCH_OUTPUT).ok_or_else(|| {
            SongsmithError::scorer_invocation_failed(format!("{} not found in output", PITCH_OUTPUT))
        })?;
        let duration_value = outputs.remove(DURATION_OUTPUT).ok_or_else(|| {
            SongsmithError::scorer_invocation_failed(format!(
                "{} not found in output",
                DURATION_OUTPUT
            ))
        })?;

        let pitch = Logits::from_2d_dyn_value(&pitch_value)?;
        let duration = Logits::from_2d_dyn_value(&duration_value)?;

        if pitch.len() != self.pitch_vocab_size() || duration.len() != self.duration_vocab_size() {
            return Err(SongsmithError::scorer_invocation_failed(format!(
                "head widths {}/{} do not match scorer.json {}/{}",
                pitch.len(),
                duration.len(),
                self.config.n_pitch,
                self.config.n_dur
            )));
        }

        Ok(ScorerOutput { pitch, duration })
    }

    fn pitch_vocab_size(&self) -> usize {
        self.config.n_pitch as usize
    }

    fn duration_vocab_size(&self) -> usize {
        self.config.n_dur as usize
    }
}

/// Builds a `[1, len]` int64 tensor from a window.
fn window_tensor(window: &[usize]) -> Result<Tensor<i64>> {
    let ids: Vec<i64> = window.iter().map(|&i| i as i64).collect();
    Tensor::from_array(([1usize, window.len()], ids)).map_err(|e| {
        SongsmithError::scorer_invocation_failed(format!("Failed to create input tensor: {}", e))
    })
}
