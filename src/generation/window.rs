//! Rolling pitch/duration windows fed to the scorer.

use rand::Rng;

use crate::error::{Result, SongsmithError};
use crate::vocab::SeedPool;

/// Fixed-length pitch and duration index windows kept in lockstep.
///
/// New pairs are appended to the backing buffers and the window start moves
/// forward; the stale prefix is dropped once it is as long as the window,
/// so sliding costs amortized O(1) and both halves stay contiguous.
#[derive(Debug, Clone)]
pub struct SequenceWindow {
    pitch: Vec<usize>,
    duration: Vec<usize>,
    start: usize,
}

impl SequenceWindow {
    /// Creates a window from two equal-length slices.
    pub fn from_slices(pitch: &[usize], duration: &[usize]) -> Result<Self> {
        if pitch.len() != duration.len() {
            return Err(SongsmithError::invalid_parameter(format!(
                "window halves differ in length: {} pitch vs {} duration",
                pitch.len(),
                duration.len()
            )));
        }

        let mut window = Self {
            pitch: Vec::with_capacity(pitch.len() * 2),
            duration: Vec::with_capacity(duration.len() * 2),
            start: 0,
        };
        window.pitch.extend_from_slice(pitch);
        window.duration.extend_from_slice(duration);
        Ok(window)
    }

    /// Slices a starting window out of the seed pool at a uniformly random
    /// offset in `[0, len - seq_len - 1]`.
    ///
    /// Returns the window and the chosen offset. Fails with
    /// INSUFFICIENT_HISTORY when the pool holds fewer than `seq_len + 1`
    /// pairs.
    pub fn seed<R: Rng + ?Sized>(pool: &SeedPool, seq_len: usize, rng: &mut R) -> Result<(Self, usize)> {
        let required = seq_len + 1;
        if pool.len() < required {
            return Err(SongsmithError::insufficient_history(pool.len(), required));
        }

        let offset = rng.gen_range(0..=pool.len() - required);
        let window = Self::from_slices(
            &pool.pitch()[offset..offset + seq_len],
            &pool.duration()[offset..offset + seq_len],
        )?;
        Ok((window, offset))
    }

    /// Appends the newest pair and drops the oldest, keeping the length.
    pub fn advance(&mut self, pitch: usize, duration: usize) {
        let len = self.len();
        if len == 0 {
            return;
        }

        self.pitch.push(pitch);
        self.duration.push(duration);
        self.start += 1;

        if self.start >= len {
            self.pitch.drain(..self.start);
            self.duration.drain(..self.start);
            self.start = 0;
        }
    }

    /// Current pitch window, oldest first.
    pub fn pitch(&self) -> &[usize] {
        &self.pitch[self.start..]
    }

    /// Current duration window, oldest first.
    pub fn duration(&self) -> &[usize] {
        &self.duration[self.start..]
    }

    /// Window length.
    pub fn len(&self) -> usize {
        self.pitch.len() - self.start
    }

    /// Returns true for a zero-length window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
