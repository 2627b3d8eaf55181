//! CLI argument parser.
//!
//! Every flag is optional; a flag that is given overrides the value from
//! the config file and the environment.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Device, SongsmithConfig};

/// Execution device choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceArg {
    /// Best available provider, falling back to CPU
    Auto,
    /// CPU only
    Cpu,
    /// NVIDIA GPU via CUDA
    Cuda,
    /// Apple Silicon via CoreML
    Metal,
}

impl From<DeviceArg> for Device {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Auto => Device::Auto,
            DeviceArg::Cpu => Device::Cpu,
            DeviceArg::Cuda => Device::Cuda,
            DeviceArg::Metal => Device::Metal,
        }
    }
}

/// songsmith: generate piano MIDI from a trained pitch/duration scorer
#[derive(Parser, Debug, Default)]
#[command(name = "songsmith")]
#[command(about = "Generate a MIDI piece from a trained pitch/duration sequence model")]
#[command(version)]
pub struct Cli {
    /// Number of notes/chords to generate
    #[arg(short, long)]
    pub notes: Option<usize>,

    /// Pitch temperature (above 1 is more adventurous)
    #[arg(long)]
    pub temperature_pitch: Option<f32>,

    /// Duration temperature (above 1 gives less repetitive rhythm)
    #[arg(long)]
    pub temperature_duration: Option<f32>,

    /// Nucleus sampling threshold
    #[arg(long)]
    pub top_p: Option<f32>,

    /// Window length fed to the scorer
    #[arg(long)]
    pub sequence_length: Option<usize>,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Stop generating after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory containing scorer.onnx and scorer.json
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Vocabulary/history JSON artifact
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Output MIDI file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Execution device
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,

    /// Intra-op thread count for ONNX Runtime
    #[arg(long)]
    pub threads: Option<u32>,

    /// Log every generation step
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Overrides config fields with the flags that were given.
    pub fn apply_to(&self, config: &mut SongsmithConfig) {
        if let Some(ref path) = self.model_dir {
            config.model_path = Some(path.clone());
        }
        if let Some(ref path) = self.vocab {
            config.vocab_path = Some(path.clone());
        }
        if let Some(ref path) = self.output {
            config.output_path = Some(path.clone());
        }
        if let Some(device) = self.device {
            config.device = device.into();
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }

        let generation = &mut config.generation;
        if let Some(notes) = self.notes {
            generation.num_notes = notes;
        }
        if let Some(t) = self.temperature_pitch {
            generation.temperature_pitch = t;
        }
        if let Some(t) = self.temperature_duration {
            generation.temperature_duration = t;
        }
        if let Some(top_p) = self.top_p {
            generation.top_p = top_p;
        }
        if let Some(len) = self.sequence_length {
            generation.sequence_length = len;
        }
        if let Some(seed) = self.seed {
            generation.seed = Some(seed);
        }
        if let Some(timeout) = self.timeout {
            generation.timeout_sec = Some(timeout);
        }
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "songsmith=debug"
        } else {
            "songsmith=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "songsmith",
            "--notes",
            "32",
            "--temperature-pitch",
            "0.8",
            "--top-p",
            "0.95",
            "--seed",
            "7",
            "--device",
            "cpu",
            "--output",
            "song.mid",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.notes, Some(32));
        assert_eq!(cli.temperature_pitch, Some(0.8));
        assert_eq!(cli.top_p, Some(0.95));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.device, Some(DeviceArg::Cpu));
        assert_eq!(cli.output, Some(PathBuf::from("song.mid")));
        assert!(cli.verbose);
    }

    #[test]
    fn unset_flags_leave_config_alone() {
        let mut config = SongsmithConfig::default();
        config.generation.num_notes = 99;
        config.generation.seed = Some(3);

        Cli::default().apply_to(&mut config);

        assert_eq!(config.generation.num_notes, 99);
        assert_eq!(config.generation.seed, Some(3));
        assert_eq!(config.device, Device::Auto);
    }

    #[test]
    fn given_flags_override_config() {
        let mut config = SongsmithConfig::default();
        let cli = Cli {
            notes: Some(10),
            temperature_duration: Some(0.7),
            sequence_length: Some(32),
            timeout: Some(60),
            vocab: Some(PathBuf::from("vocab.json")),
            device: Some(DeviceArg::Metal),
            ..Default::default()
        };

        cli.apply_to(&mut config);

        assert_eq!(config.generation.num_notes, 10);
        assert_eq!(config.generation.temperature_duration, 0.7);
        assert_eq!(config.generation.sequence_length, 32);
        assert_eq!(config.generation.timeout_sec, Some(60));
        assert_eq!(config.vocab_path, Some(PathBuf::from("vocab.json")));
        assert_eq!(config.device, Device::Metal);
    }

    #[test]
    fn verbose_raises_log_level() {
        let cli = Cli {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(cli.log_filter(), "songsmith=debug");
        assert_eq!(Cli::default().log_filter(), "songsmith=info");
    }
}
