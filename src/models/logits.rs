//! Logits processing for scorer output.
//!
//! Handles temperature scaling and nucleus (top-p) sampling for one head of
//! the scorer.

use std::fmt::{Debug, Formatter};
use std::ops::Deref;

use half::f16;
use ndarray::{Array1, Ix2, IxDyn};
use ort::value::DynValue;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

use crate::error::{Result, SongsmithError};

/// Wrapper around a 1D logits vector with processing methods.
#[derive(Clone, PartialEq)]
pub struct Logits(Array1<f32>);

impl Deref for Logits {
    type Target = Array1<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Debug for Logits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Logits({})", self.0.len())
    }
}

impl From<Vec<f32>> for Logits {
    fn from(values: Vec<f32>) -> Self {
        Self(Array1::from(values))
    }
}

impl Logits {
    /// Creates Logits from a 2D DynValue, supporting both f32 and f16.
    ///
    /// The input shape is expected to be [1, vocab_size]: one batch entry,
    /// the prediction for the token after the window.
    pub fn from_2d_dyn_value(value: &DynValue) -> Result<Self> {
        let (shape, data): (Vec<usize>, Vec<f32>) =
            if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                let shape_vec: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
                (shape_vec, data.to_vec())
            } else if let Ok((shape, data)) = value.try_extract_tensor::<f16>() {
                let shape_vec: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
                let data_f32: Vec<f32> = data.iter().map(|e| f32::from(*e)).collect();
                (shape_vec, data_f32)
            } else {
                return Err(SongsmithError::scorer_invocation_failed(
                    "Logits must be f32 or f16",
                ));
            };

        let arr = ndarray::Array::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
            SongsmithError::scorer_invocation_failed(format!("Failed to create array: {}", e))
        })?;

        let arr = arr.into_dimensionality::<Ix2>().map_err(|e| {
            SongsmithError::scorer_invocation_failed(format!("Expected 2D logits: {}", e))
        })?;

        if arr.nrows() != 1 {
            return Err(SongsmithError::scorer_invocation_failed(format!(
                "Expected a batch of 1, got {}",
                arr.nrows()
            )));
        }

        Ok(Self(arr.row(0).to_owned()))
    }

    /// Divides every logit by `temperature`.
    ///
    /// Above 1 flattens the distribution, below 1 sharpens it toward the mode.
    pub fn apply_temperature(mut self, temperature: f32) -> Self {
        self.0.mapv_inplace(|v| v / temperature);
        self
    }

    /// Converts the logits to probabilities.
    ///
    /// Subtracts the maximum before exponentiating so large logits do not
    /// overflow.
    pub fn softmax(&self) -> Result<Array1<f32>> {
        if self.0.is_empty() {
            return Err(SongsmithError::sampling_failed("empty logits"));
        }

        if self.0.iter().any(|v| v.is_nan() || *v == f32::INFINITY) {
            return Err(SongsmithError::sampling_failed(
                "logits contain NaN or +inf",
            ));
        }

        let max = self.0.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        if max == f32::NEG_INFINITY {
            return Err(SongsmithError::sampling_failed("every logit is -inf"));
        }

        let exp = self.0.mapv(|v| (v - max).exp());
        let sum = exp.sum();
        Ok(exp / sum)
    }

    /// Samples one index using nucleus (top-p) sampling.
    ///
    /// See [`nucleus_filter`] for which indices stay eligible.
    pub fn sample_nucleus<R: Rng + ?Sized>(&self, top_p: f32, rng: &mut R) -> Result<usize> {
        let probs = nucleus_filter(&self.softmax()?, top_p)?;

        let distribution = WeightedIndex::new(probs.iter().copied()).map_err(|e| {
            SongsmithError::sampling_failed(format!("Could not build distribution: {}", e))
        })?;

        Ok(distribution.sample(rng))
    }
}

/// Restricts a probability vector to its nucleus and renormalizes it.
///
/// Indices are sorted by descending probability and the cumulative sum is
/// taken over that order. A sorted position is removed when the cumulative
/// mass *before* it already exceeds `top_p`; the most probable index is
/// always kept. The token that first pushes the mass over `top_p` therefore
/// stays in the nucleus. With `top_p >= 1` nothing is removed.
pub fn nucleus_filter(probs: &Array1<f32>, top_p: f32) -> Result<Array1<f32>> {
    let mut order: Vec<usize> = (0..probs.len()).collect();
    // Stable sort: equal probabilities keep index order.
    order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));

    let mut filtered = probs.clone();
    let mut cumulative = 0.0f32;
    for (rank, &index) in order.iter().enumerate() {
        // Rounding can push the running sum past 1.0; a threshold of 1 or
        // more never removes anything.
        if rank > 0 && top_p < 1.0 && cumulative > top_p {
            filtered[index] = 0.0;
        }
        cumulative += probs[index];
    }

    let total = filtered.sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(SongsmithError::sampling_failed(
            "no probability mass left after nucleus filtering",
        ));
    }

    Ok(filtered / total)
}

/// Default nucleus threshold.
pub const DEFAULT_TOP_P: f32 = 0.9;
