//! Trained-model strategy.
//!
//! [`TensorModel`] owns the pre- and post-processing around a network; the
//! network itself sits behind the [`Inference`] trait so any runtime
//! (ONNX, ncnn, a remote service) can be plugged in.
//!
//! # Input
//!
//! 63 floats: the 21 landmarks flattened as `[x, y, z, ...]`, relative to
//! the wrist and scaled by the largest absolute component into `[-1, 1]`.
//!
//! # Output
//!
//! One probability per entry of [`SIGN_CLASSES`], in order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::landmark::{Hand, HAND_LANDMARKS};
use crate::{Classification, GestureError, Landmark, SignModel};

/// Input vector length.
pub const INPUT_SIZE: usize = HAND_LANDMARKS * 3;

/// Minimum probability for a prediction to be reported.
pub const MIN_PROBABILITY: f32 = 0.6;

/// Output labels in network order.
pub const SIGN_CLASSES: [&str; 46] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "HELLO", "THANK YOU", "SORRY", "PLEASE", "YES", "NO", "GOOD", "BAD", "HELP", "STOP",
];

/// Runs a network forward pass.
pub trait Inference: Send + Sync {
    /// Returns one probability per output class.
    fn predict(&self, input: &[f32]) -> Result<Vec<f32>, GestureError>;
}

/// A ranked alternative, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sign: String,
    pub confidence: f32,
}

/// Single-hand classifier backed by a trained network.
pub struct TensorModel {
    backend: Arc<dyn Inference>,
    min_probability: f32,
}

impl TensorModel {
    pub fn new(backend: Arc<dyn Inference>) -> Self {
        Self {
            backend,
            min_probability: MIN_PROBABILITY,
        }
    }

    pub fn with_min_probability(mut self, min_probability: f32) -> Self {
        self.min_probability = min_probability;
        self
    }

    /// Runs the backend and returns the top predictions, best first.
    ///
    /// Returns an empty list when the best prediction is below the
    /// probability floor.
    pub fn predict(&self, hand: &Hand, top_k: usize) -> Result<Vec<Prediction>, GestureError> {
        let input = preprocess(hand);
        let probs = self.backend.predict(&input)?;
        if probs.len() != SIGN_CLASSES.len() {
            return Err(GestureError::DimensionMismatch {
                expected: SIGN_CLASSES.len(),
                got: probs.len(),
            });
        }

        let mut ranked: Vec<(usize, f32)> = probs.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        match ranked.first() {
            Some((_, p)) if *p >= self.min_probability => {}
            _ => return Ok(Vec::new()),
        }

        Ok(ranked
            .into_iter()
            .take(top_k.max(1))
            .map(|(idx, p)| Prediction {
                sign: SIGN_CLASSES[idx].to_string(),
                confidence: p * 100.0,
            })
            .collect())
    }
}

impl SignModel for TensorModel {
    fn name(&self) -> &str {
        "tensor"
    }

    fn classify(&self, landmarks: &[Landmark]) -> Option<Classification> {
        let hand = match Hand::new(landmarks) {
            Ok(hand) => hand,
            Err(err) => {
                debug!(error = %err, "gesture: skipping frame");
                return None;
            }
        };
        match self.predict(&hand, 3) {
            Ok(predictions) => {
                let best = predictions.first()?;
                if predictions.len() > 1 {
                    debug!(alternatives = ?&predictions[1..], "gesture: tensor prediction");
                }
                Some(Classification::new(best.sign.clone(), best.confidence))
            }
            Err(err) => {
                warn!(error = %err, "gesture: inference failed");
                None
            }
        }
    }

    fn supported_signs(&self) -> Vec<String> {
        SIGN_CLASSES.iter().map(|s| s.to_string()).collect()
    }
}

/// Wrist-relative, max-abs scaled input vector.
pub fn preprocess(hand: &Hand) -> Vec<f32> {
    let flat = hand.wrist_relative();
    let max = flat.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if max > 0.0 {
        flat.into_iter().map(|v| v / max).collect()
    } else {
        flat
    }
}
