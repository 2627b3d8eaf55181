//! songsmith: generate a MIDI piece from a trained pitch/duration scorer.
//!
//! Loads the vocabulary and scorer once, runs one generation with the
//! layered configuration, writes the MIDI file and prints a summary.

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use songsmith::cli::Cli;
use songsmith::config::SongsmithConfig;
use songsmith::generation::{compose_to_file, CancelFlag, GenerationContext};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match cli.config {
        Some(ref path) => SongsmithConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SongsmithConfig::default(),
    };
    config.apply_env();
    cli.apply_to(&mut config);

    if let Some(reason) = config.validate() {
        bail!("invalid configuration: {}", reason);
    }

    let model_dir = config.effective_model_path();
    let vocab_path = config.effective_vocab_path();
    let output_path = config.effective_output_path();
    let generation = &config.generation;

    eprintln!("=== songsmith ===");
    eprintln!("Notes: {}", generation.num_notes);
    eprintln!(
        "Temperature: pitch {:.2}, duration {:.2}",
        generation.temperature_pitch, generation.temperature_duration
    );
    eprintln!("Top-p: {:.2}", generation.top_p);
    eprintln!("Sequence length: {}", generation.sequence_length);
    if let Some(seed) = generation.seed {
        eprintln!("Seed: {}", seed);
    }
    eprintln!("Device: {}", config.device);
    eprintln!("Model directory: {}", model_dir.display());
    eprintln!("Vocabulary: {}", vocab_path.display());
    eprintln!("Output: {}", output_path.display());
    eprintln!();

    let ctx = GenerationContext::load(&config).context("loading artifacts")?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let piece = compose_to_file(&ctx, generation, &output_path, &CancelFlag::new())
        .context("generation failed")?;

    eprintln!();
    eprintln!("Generation complete!");
    eprintln!("  Piece: {}", piece.piece_id);
    eprintln!("  Seed: {}", piece.seed);
    eprintln!("  Time: {:.2}s", piece.generation_time_sec);
    eprintln!(
        "  Events: {} ({} rendered, {} skipped)",
        piece.num_events, piece.rendered, piece.skipped
    );
    eprintln!("Saved to: {}", piece.path.display());

    Ok(())
}
