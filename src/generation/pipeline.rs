//! Autoregressive generation loop.
//!
//! Seeds a window from the history pool, then repeatedly scores the window,
//! samples one pitch and one duration, and slides the window forward.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::error::{Result, SongsmithError};
use crate::render::{render, write_midi, Score};
use crate::types::{GeneratedEvent, GeneratedPiece};

use super::context::GenerationContext;
use super::window::SequenceWindow;

/// Loop parameters for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Events to produce.
    pub num_steps: usize,
    /// Window length fed to the scorer.
    pub sequence_length: usize,
    pub temperature_pitch: f32,
    pub temperature_duration: f32,
    /// Nucleus threshold shared by both heads.
    pub top_p: f32,
    /// Wall-clock budget for the whole loop.
    pub timeout: Option<Duration>,
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            num_steps: config.num_notes,
            sequence_length: config.sequence_length,
            temperature_pitch: config.temperature_pitch,
            temperature_duration: config.temperature_duration,
            top_p: config.top_p,
            timeout: config.timeout_sec.map(Duration::from_secs),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl GenerationParams {
    /// Rejects parameters the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.temperature_pitch.is_finite() && self.temperature_pitch > 0.0) {
            return Err(SongsmithError::invalid_parameter(format!(
                "temperature_pitch must be > 0, got {}",
                self.temperature_pitch
            )));
        }
        if !(self.temperature_duration.is_finite() && self.temperature_duration > 0.0) {
            return Err(SongsmithError::invalid_parameter(format!(
                "temperature_duration must be > 0, got {}",
                self.temperature_duration
            )));
        }
        if self.top_p.is_nan() || self.top_p <= 0.0 {
            return Err(SongsmithError::invalid_parameter(format!(
                "top_p must be > 0, got {}",
                self.top_p
            )));
        }
        if self.sequence_length == 0 {
            return Err(SongsmithError::invalid_parameter(
                "sequence_length must be > 0",
            ));
        }
        Ok(())
    }
}

/// Cooperative cancellation flag, checked between generation steps.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the generation stop before its next step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Generates `params.num_steps` events.
///
/// See [`generate_with_progress`].
pub fn generate<R: Rng + ?Sized>(
    ctx: &GenerationContext,
    params: &GenerationParams,
    rng: &mut R,
    cancel: &CancelFlag,
) -> Result<Vec<GeneratedEvent>> {
    generate_with_progress(ctx, params, rng, cancel, |_, _| {})
}

/// Generates events with progress callback.
///
/// # Arguments
///
/// * `ctx` - Shared scorer and vocabularies
/// * `params` - Loop parameters
/// * `rng` - Source for the start offset and every sample
/// * `cancel` - Checked before each step
/// * `on_progress` - Callback receiving (steps_done, steps_total)
///
/// # Errors
///
/// INSUFFICIENT_HISTORY before any scorer call when the seed pool is too
/// short. Any scorer, sampling or resolution failure aborts the whole
/// generation with no partial output, as do cancellation and an exceeded
/// timeout.
pub fn generate_with_progress<R, F>(
    ctx: &GenerationContext,
    params: &GenerationParams,
    rng: &mut R,
    cancel: &CancelFlag,
    mut on_progress: F,
) -> Result<Vec<GeneratedEvent>>
where
    R: Rng + ?Sized,
    F: FnMut(usize, usize),
{
    params.validate()?;

    let (mut window, offset) =
        SequenceWindow::seed(ctx.vocab().seed_pool(), params.sequence_length, &mut *rng)?;

    debug!(
        offset,
        sequence_length = params.sequence_length,
        num_steps = params.num_steps,
        "seeded window"
    );

    let started = Instant::now();
    let total = params.num_steps;
    let mut events = Vec::with_capacity(total);

    for step in 0..total {
        if cancel.is_cancelled() {
            info!(step, total, "generation cancelled");
            return Err(SongsmithError::generation_cancelled(step, total));
        }
        if let Some(timeout) = params.timeout {
            if started.elapsed() > timeout {
                info!(step, total, timeout_sec = timeout.as_secs(), "generation timed out");
                return Err(SongsmithError::generation_cancelled(step, total));
            }
        }

        let output = ctx.scorer().evaluate(window.pitch(), window.duration())?;

        let pitch_index = output
            .pitch
            .apply_temperature(params.temperature_pitch)
            .sample_nucleus(params.top_p, &mut *rng)?;
        let duration_index = output
            .duration
            .apply_temperature(params.temperature_duration)
            .sample_nucleus(params.top_p, &mut *rng)?;

        let pitch = ctx
            .vocab()
            .pitch()
            .token_at(pitch_index)
            .ok_or_else(|| SongsmithError::token_resolution_failed("pitch", pitch_index))?;
        let duration = ctx
            .vocab()
            .duration()
            .token_at(duration_index)
            .ok_or_else(|| SongsmithError::token_resolution_failed("duration", duration_index))?;

        debug!(step, pitch, duration, "sampled event");

        events.push(GeneratedEvent::new(pitch, duration));
        window.advance(pitch_index, duration_index);

        on_progress(step + 1, total);
    }

    Ok(events)
}

/// Generated events together with their rendered score.
#[derive(Debug, Clone)]
pub struct Composition {
    pub events: Vec<GeneratedEvent>,
    pub score: Score,
    /// Seed the generation RNG was built from.
    pub seed: u64,
}

/// Runs one seeded generation and renders the result.
///
/// Uses `generation.seed` when set, otherwise a freshly drawn seed, so the
/// returned seed always reproduces the composition.
pub fn compose(
    ctx: &GenerationContext,
    generation: &GenerationConfig,
    cancel: &CancelFlag,
) -> Result<Composition> {
    let seed = generation.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let params = GenerationParams::from(generation);

    info!(
        seed,
        num_notes = params.num_steps,
        temperature_pitch = params.temperature_pitch,
        temperature_duration = params.temperature_duration,
        top_p = params.top_p,
        "starting generation"
    );

    let events = generate(ctx, &params, &mut rng, cancel)?;
    let score = render(&events);

    Ok(Composition {
        events,
        score,
        seed,
    })
}

/// Generates, renders and writes one MIDI file, replacing any existing one.
pub fn compose_to_file(
    ctx: &GenerationContext,
    generation: &GenerationConfig,
    output_path: &Path,
    cancel: &CancelFlag,
) -> Result<GeneratedPiece> {
    let start_time = Instant::now();

    let composition = compose(ctx, generation, cancel)?;
    write_midi(&composition.score, output_path)?;

    let piece = GeneratedPiece::new(
        output_path.to_path_buf(),
        generation,
        composition.seed,
        composition.score.elements.len(),
        composition.score.skipped.len(),
        start_time.elapsed().as_secs_f32(),
    );

    info!(
        piece_id = %piece.piece_id,
        path = %output_path.display(),
        rendered = piece.rendered,
        skipped = piece.skipped,
        quarter_lengths = composition.score.total_quarter_length(),
        "piece written"
    );

    Ok(piece)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_follow_config() {
        let config = GenerationConfig {
            num_notes: 12,
            timeout_sec: Some(3),
            ..Default::default()
        };
        let params = GenerationParams::from(&config);
        assert_eq!(params.num_steps, 12);
        assert_eq!(params.sequence_length, 128);
        assert_eq!(params.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn params_validation() {
        assert!(GenerationParams::default().validate().is_ok());

        let bad = GenerationParams {
            temperature_duration: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = GenerationParams {
            top_p: f32::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = GenerationParams {
            sequence_length: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
