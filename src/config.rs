//! Runtime configuration.
//!
//! Contains the runtime configuration for songsmith: artifact and output
//! paths, execution device selection, and the generation settings.
//!
//! Layering, lowest precedence first: defaults, an optional JSON config
//! file, `SONGSMITH_*` environment variables, then CLI flags (applied by the
//! binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SongsmithError};
use crate::models::DEFAULT_TOP_P;

/// Execution device for ONNX inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Use the best available execution provider, falling back to CPU.
    #[default]
    Auto,

    /// Force CPU execution.
    Cpu,

    /// NVIDIA GPU via CUDA.
    Cuda,

    /// Apple Silicon via CoreML.
    Metal,
}

impl Device {
    /// Returns the string representation of the device.
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Auto => "auto",
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Metal => "metal",
        }
    }

    /// Parses a device from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Device::Auto),
            "cpu" => Some(Device::Cpu),
            "cuda" => Some(Device::Cuda),
            "metal" | "coreml" | "mps" => Some(Device::Metal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of events to generate.
    pub num_notes: usize,

    /// Divisor for pitch logits. Above 1 is riskier, below 1 is safer.
    pub temperature_pitch: f32,

    /// Divisor for duration logits. Above 1 gives less repetitive rhythm.
    pub temperature_duration: f32,

    /// Nucleus sampling threshold.
    pub top_p: f32,

    /// Window length fed to the scorer.
    pub sequence_length: usize,

    /// Seed for the generation RNG. If None, a random seed is drawn.
    pub seed: Option<u64>,

    /// Wall-clock budget for the generation loop, in seconds.
    pub timeout_sec: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_notes: 64,
            temperature_pitch: 1.0,
            temperature_duration: 1.1,
            top_p: DEFAULT_TOP_P,
            sequence_length: 128,
            seed: None,
            timeout_sec: None,
        }
    }
}

impl GenerationConfig {
    /// Validates the generation settings.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if !(self.temperature_pitch.is_finite() && self.temperature_pitch > 0.0) {
            return Some(format!(
                "temperature_pitch must be > 0, got {}",
                self.temperature_pitch
            ));
        }

        if !(self.temperature_duration.is_finite() && self.temperature_duration > 0.0) {
            return Some(format!(
                "temperature_duration must be > 0, got {}",
                self.temperature_duration
            ));
        }

        if self.top_p.is_nan() || self.top_p <= 0.0 {
            return Some(format!("top_p must be > 0, got {}", self.top_p));
        }

        if self.sequence_length == 0 {
            return Some("sequence_length must be > 0".to_string());
        }

        if self.timeout_sec == Some(0) {
            return Some("timeout_sec must be > 0 when set".to_string());
        }

        None
    }
}

/// Runtime configuration for songsmith.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SongsmithConfig {
    /// Directory containing `scorer.onnx` and `scorer.json`.
    /// If None, uses the platform-specific default data location.
    pub model_path: Option<PathBuf>,

    /// Vocabulary/history artifact written by the training phase.
    /// If None, uses the platform-specific default data location.
    pub vocab_path: Option<PathBuf>,

    /// Where the rendered MIDI file is written (overwritten each run).
    /// If None, uses the platform-specific default cache location.
    pub output_path: Option<PathBuf>,

    /// Execution device for inference.
    pub device: Device,

    /// Number of threads for intra-op parallelism in ONNX Runtime.
    /// If None, uses ONNX Runtime's default.
    pub threads: Option<u32>,

    /// Generation settings.
    pub generation: GenerationConfig,
}

impl Default for SongsmithConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            vocab_path: None,
            output_path: None,
            device: Device::Auto,
            threads: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl SongsmithConfig {
    /// Creates a new SongsmithConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SongsmithError::artifact_not_found(path.display().to_string())
            } else {
                SongsmithError::artifact_load_failed(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SongsmithError::artifact_load_failed(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Creates a SongsmithConfig from environment variables.
    ///
    /// See [`SongsmithConfig::apply_env`] for the variables read.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overrides fields from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `SONGSMITH_MODEL_PATH` - Scorer directory
    /// - `SONGSMITH_VOCAB_PATH` - Vocabulary/history artifact
    /// - `SONGSMITH_OUTPUT_PATH` - MIDI output file
    /// - `SONGSMITH_DEVICE` - Device selection (auto, cpu, cuda, metal)
    /// - `SONGSMITH_THREADS` - Number of threads for CPU execution
    /// - `SONGSMITH_NUM_NOTES` - Events to generate
    /// - `SONGSMITH_TEMPERATURE_PITCH` / `SONGSMITH_TEMPERATURE_DURATION`
    /// - `SONGSMITH_TOP_P` - Nucleus threshold
    /// - `SONGSMITH_SEQUENCE_LENGTH` - Scorer window length
    /// - `SONGSMITH_SEED` - Generation seed
    ///
    /// Unset or unparsable variables leave the field unchanged.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("SONGSMITH_MODEL_PATH") {
            self.model_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("SONGSMITH_VOCAB_PATH") {
            self.vocab_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("SONGSMITH_OUTPUT_PATH") {
            self.output_path = Some(PathBuf::from(path));
        }

        if let Ok(device_str) = std::env::var("SONGSMITH_DEVICE") {
            if let Some(device) = Device::parse(&device_str) {
                self.device = device;
            }
        }

        if let Some(threads) = env_parse::<u32>("SONGSMITH_THREADS") {
            if threads > 0 {
                self.threads = Some(threads);
            }
        }

        if let Some(num_notes) = env_parse::<usize>("SONGSMITH_NUM_NOTES") {
            self.generation.num_notes = num_notes;
        }

        if let Some(t) = env_parse::<f32>("SONGSMITH_TEMPERATURE_PITCH") {
            self.generation.temperature_pitch = t;
        }

        if let Some(t) = env_parse::<f32>("SONGSMITH_TEMPERATURE_DURATION") {
            self.generation.temperature_duration = t;
        }

        if let Some(top_p) = env_parse::<f32>("SONGSMITH_TOP_P") {
            self.generation.top_p = top_p;
        }

        if let Some(len) = env_parse::<usize>("SONGSMITH_SEQUENCE_LENGTH") {
            self.generation.sequence_length = len;
        }

        if let Some(seed) = env_parse::<u64>("SONGSMITH_SEED") {
            self.generation.seed = Some(seed);
        }
    }

    /// Returns the effective scorer directory, using platform defaults if not specified.
    pub fn effective_model_path(&self) -> PathBuf {
        if let Some(ref path) = self.model_path {
            path.clone()
        } else {
            default_data_path().join("model")
        }
    }

    /// Returns the effective vocabulary artifact path, using platform defaults if not specified.
    pub fn effective_vocab_path(&self) -> PathBuf {
        if let Some(ref path) = self.vocab_path {
            path.clone()
        } else {
            default_data_path().join("processed_midi.json")
        }
    }

    /// Returns the effective MIDI output path, using platform defaults if not specified.
    pub fn effective_output_path(&self) -> PathBuf {
        if let Some(ref path) = self.output_path {
            path.clone()
        } else {
            default_output_path()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if let Some(threads) = self.threads {
            if threads == 0 {
                return Some("threads must be > 0".to_string());
            }
            if threads > 256 {
                return Some(format!("threads too high: {} (max 256)", threads));
            }
        }

        self.generation.validate()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Returns the platform-specific default artifact directory.
///
/// - macOS: ~/Library/Application Support/songsmith
/// - Linux: ~/.local/share/songsmith
/// - Windows: C:\Users\<user>\AppData\Roaming\songsmith\data
fn default_data_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "songsmith") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from("./output")
    }
}

/// Returns the platform-specific default MIDI output path.
///
/// - macOS: ~/Library/Caches/songsmith/output.mid
/// - Linux: ~/.cache/songsmith/output.mid
/// - Windows: C:\Users\<user>\AppData\Local\songsmith\cache\output.mid
fn default_output_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "songsmith") {
        proj_dirs.cache_dir().join("output.mid")
    } else {
        PathBuf::from("./output/output.mid")
    }
}
