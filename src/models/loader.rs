//! Scorer loader.
//!
//! Handles locating the scorer artifacts, reading the topology and
//! building the ONNX session on the configured device.

use std::path::Path;

use ort::execution_providers::{
    CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProviderDispatch,
};
use tracing::info;

use crate::config::Device;
use crate::error::{Result, SongsmithError};
use crate::types::ScorerConfig;

use super::onnx::OnnxScorer;

/// Exported scorer graph.
pub const SCORER_MODEL_FILE: &str = "scorer.onnx";

/// Topology written next to the graph by the export step.
pub const SCORER_CONFIG_FILE: &str = "scorer.json";

/// Required model files for the scorer.
pub const REQUIRED_MODEL_FILES: &[&str] = &[SCORER_MODEL_FILE, SCORER_CONFIG_FILE];

/// Checks if all required model files exist in the directory.
///
/// Returns Ok(()) if all files exist, or an error listing missing files.
pub fn check_models(model_dir: &Path) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_MODEL_FILES
        .iter()
        .copied()
        .filter(|file| !model_dir.join(file).exists())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SongsmithError::artifact_not_found(format!(
            "{} (missing: {})",
            model_dir.display(),
            missing.join(", ")
        )))
    }
}

/// Reads and validates `scorer.json`.
pub fn load_scorer_config(model_dir: &Path) -> Result<ScorerConfig> {
    let config_path = model_dir.join(SCORER_CONFIG_FILE);

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        SongsmithError::artifact_load_failed(format!("Failed to read {}: {}", SCORER_CONFIG_FILE, e))
    })?;

    let config: ScorerConfig = serde_json::from_str(&content).map_err(|e| {
        SongsmithError::artifact_load_failed(format!("Failed to parse {}: {}", SCORER_CONFIG_FILE, e))
    })?;

    if let Some(reason) = config.validate() {
        return Err(SongsmithError::artifact_load_failed(format!(
            "Invalid {}: {}",
            SCORER_CONFIG_FILE, reason
        )));
    }

    Ok(config)
}

/// Returns the execution providers to register for a device.
///
/// ONNX Runtime falls back to CPU when a provider is unavailable.
pub fn execution_providers(device: Device) -> Vec<ExecutionProviderDispatch> {
    match device {
        Device::Cpu => Vec::new(),
        Device::Cuda => vec![CUDAExecutionProvider::default().build()],
        Device::Metal => vec![CoreMLExecutionProvider::default().build()],
        Device::Auto => {
            if cfg!(target_os = "macos") {
                vec![CoreMLExecutionProvider::default().build()]
            } else {
                vec![CUDAExecutionProvider::default().build()]
            }
        }
    }
}

/// Loads the scorer from a directory holding `scorer.onnx` and `scorer.json`.
///
/// The returned scorer is inference-only: nothing in this crate updates
/// its parameters.
pub fn load_scorer(model_dir: &Path, device: Device, threads: Option<u32>) -> Result<OnnxScorer> {
    check_models(model_dir)?;

    let config = load_scorer_config(model_dir)?;

    info!(
        model_dir = %model_dir.display(),
        device = %device,
        n_pitch = config.n_pitch,
        n_dur = config.n_dur,
        hidden_size = config.hidden_size,
        num_layers = config.num_layers,
        "loading scorer"
    );

    let providers = execution_providers(device);
    let scorer = OnnxScorer::load(
        &model_dir.join(SCORER_MODEL_FILE),
        config,
        &providers,
        threads,
        device.as_str(),
    )?;

    info!("scorer loaded");
    Ok(scorer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_files_list() {
        assert_eq!(REQUIRED_MODEL_FILES.len(), 2);
        assert!(REQUIRED_MODEL_FILES.contains(&"scorer.onnx"));
        assert!(REQUIRED_MODEL_FILES.contains(&"scorer.json"));
    }

    #[test]
    fn check_models_lists_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SCORER_CONFIG_FILE), "{}").unwrap();

        let err = check_models(dir.path()).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ArtifactNotFound);
        assert!(err.message.contains("scorer.onnx"));
        assert!(!err.message.contains("scorer.json"));
    }

    #[test]
    fn scorer_config_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SCORER_CONFIG_FILE),
            r#"{"n_pitch":0,"n_dur":3,"embed_pitch":8,"embed_dur":4,
                "hidden_size":16,"num_layers":1,"sequence_length":8}"#,
        )
        .unwrap();

        let err = load_scorer_config(dir.path()).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ArtifactLoadFailed);
    }

    #[test]
    fn cpu_registers_no_providers() {
        assert!(execution_providers(Device::Cpu).is_empty());
        assert_eq!(execution_providers(Device::Cuda).len(), 1);
    }
}
