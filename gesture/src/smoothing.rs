use std::collections::VecDeque;

use crate::Classification;

/// Majority-vote filter over a trailing window of classifications.
///
/// Suppresses per-frame flicker by only reporting a sign once it dominates
/// the recent window.
///
/// # Algorithm
///
/// The buffer keeps the last N results (FIFO). On each [`GestureBuffer::add`]
/// it tallies occurrences and summed confidence per label, in first-seen
/// order:
///
/// - fewer than `min_samples` entries -> `None`
/// - top label count >= ceil(len / 2) -> that label, mean confidence
/// - otherwise -> `None`
///
/// Ties on count go to the label seen first in the window.
#[derive(Debug, Clone)]
pub struct GestureBuffer {
    window: VecDeque<Classification>,
    window_size: usize,
    min_samples: usize,
}

/// Configuration for [`GestureBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Sliding window size (default: 5).
    pub window_size: usize,
    /// Entries required before anything is reported (default: 3).
    /// Values below 3 are raised to 3.
    pub min_samples: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            min_samples: 3,
        }
    }
}

/// Fewest entries the buffer will ever vote on.
pub const MIN_SAMPLES_FLOOR: usize = 3;

struct Tally<'a> {
    sign: &'a str,
    count: usize,
    total_confidence: f32,
    two_handed: bool,
}

impl GestureBuffer {
    /// Creates a buffer with default configuration (window=5, min_samples=3).
    pub fn new() -> Self {
        Self::with_config(SmoothingConfig::default())
    }

    /// Creates a buffer with the given configuration.
    ///
    /// A window smaller than [`MIN_SAMPLES_FLOOR`] falls back to the default
    /// window. `min_samples` is kept within `MIN_SAMPLES_FLOOR..=window_size`.
    pub fn with_config(cfg: SmoothingConfig) -> Self {
        let defaults = SmoothingConfig::default();
        let window_size = if cfg.window_size >= MIN_SAMPLES_FLOOR {
            cfg.window_size
        } else {
            defaults.window_size
        };
        let min_samples = if cfg.min_samples <= window_size {
            cfg.min_samples.max(MIN_SAMPLES_FLOOR)
        } else {
            defaults.min_samples
        };
        Self {
            window: VecDeque::with_capacity(window_size + 1),
            window_size,
            min_samples,
        }
    }

    /// Adds a classification and returns the smoothed result, if stable.
    pub fn add(&mut self, result: Classification) -> Option<Classification> {
        self.window.push_back(result);
        while self.window.len() > self.window_size {
            self.window.pop_front();
        }

        if self.window.len() < self.min_samples {
            return None;
        }

        let mut tallies: Vec<Tally<'_>> = Vec::with_capacity(self.window.len());
        for item in &self.window {
            match tallies.iter_mut().find(|t| t.sign == item.sign) {
                Some(t) => {
                    t.count += 1;
                    t.total_confidence += item.confidence;
                }
                None => tallies.push(Tally {
                    sign: &item.sign,
                    count: 1,
                    total_confidence: item.confidence,
                    two_handed: item.two_handed,
                }),
            }
        }

        let mut best: Option<&Tally<'_>> = None;
        for t in &tallies {
            if best.is_none_or(|b| t.count > b.count) {
                best = Some(t);
            }
        }
        let best = best?;

        if best.count >= self.window.len().div_ceil(2) {
            Some(Classification {
                sign: best.sign.to_string(),
                confidence: (best.total_confidence / best.count as f32).round(),
                two_handed: best.two_handed,
            })
        } else {
            None
        }
    }

    /// Number of entries currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Clears the window state.
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

impl Default for GestureBuffer {
    fn default() -> Self {
        Self::new()
    }
}
