//! Sentence boundary state machine.
//!
//! # States
//!
//! ```text
//!   Empty --add--> Accumulating --pause elapses--> BoundaryReady
//!                       ^                              |
//!                       +-----------add----------------+
//!   Accumulating/BoundaryReady --build--> Completed --clear--> Empty
//! ```
//!
//! The builder never runs a timer. Callers poll [`SentenceBuilder::progress_percent`]
//! or [`SentenceBuilder::boundary_reached`] and call [`SentenceBuilder::build`]
//! when they decide a sentence is over.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::lexicon::compose_words;
use crate::phrases::find_phrase;
use crate::{Clock, Language, SystemClock};

/// Configuration for [`SentenceBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Quiet period that ends a sentence (default: 2500 ms).
    pub pause_ms: u64,
    /// Tokens required before a sentence can be built (default: 1).
    pub min_gestures: usize,
    /// Hard cap on tokens per sentence (default and maximum: 10).
    pub max_gestures: usize,
}

/// Most tokens a sentence may ever hold.
pub const MAX_SENTENCE_GESTURES: usize = 10;

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            pause_ms: 2500,
            min_gestures: 1,
            max_gestures: MAX_SENTENCE_GESTURES,
        }
    }
}

/// One accepted token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceGesture {
    pub sign: String,
    pub confidence: f32,
    pub timestamp_ms: u64,
}

/// Result of [`SentenceBuilder::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub added: bool,
    pub current_gestures: Vec<String>,
    /// The caller should build the sentence now.
    pub sentence_ready: bool,
}

/// A rendered sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltSentence {
    pub gestures: Vec<String>,
    pub english: String,
    pub swahili: String,
    /// Rounded mean token confidence (0-100).
    pub avg_confidence: u32,
}

impl BuiltSentence {
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Swahili => &self.swahili,
        }
    }
}

/// Where the builder is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SentenceState {
    #[default]
    Empty,
    Accumulating,
    BoundaryReady,
    Completed,
}

impl SentenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentenceState::Empty => "empty",
            SentenceState::Accumulating => "accumulating",
            SentenceState::BoundaryReady => "boundary_ready",
            SentenceState::Completed => "completed",
        }
    }

    /// Returns true if new tokens are accepted in this state.
    pub fn is_open(&self) -> bool {
        !matches!(self, SentenceState::Completed)
    }
}

impl fmt::Display for SentenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SentenceState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Groups stable signs into sentences.
pub struct SentenceBuilder {
    config: BuilderConfig,
    clock: Arc<dyn Clock>,
    gestures: Vec<SentenceGesture>,
    last_sign: Option<String>,
    last_time: Option<u64>,
    completed: Option<BuiltSentence>,
}

impl SentenceBuilder {
    /// Creates a builder on the system clock.
    pub fn new(config: BuilderConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a builder on the given clock.
    ///
    /// Zero values in `config` fall back to the defaults. `max_gestures` is
    /// capped at [`MAX_SENTENCE_GESTURES`].
    pub fn with_clock(config: BuilderConfig, clock: Arc<dyn Clock>) -> Self {
        let defaults = BuilderConfig::default();
        let config = BuilderConfig {
            pause_ms: if config.pause_ms > 0 {
                config.pause_ms
            } else {
                defaults.pause_ms
            },
            min_gestures: if config.min_gestures > 0 {
                config.min_gestures
            } else {
                defaults.min_gestures
            },
            max_gestures: if config.max_gestures > 0 {
                config.max_gestures.min(MAX_SENTENCE_GESTURES)
            } else {
                defaults.max_gestures
            },
        };
        Self {
            config,
            clock,
            gestures: Vec::new(),
            last_sign: None,
            last_time: None,
            completed: None,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Offers a stable sign to the current sentence.
    ///
    /// Rejected when it repeats the previous token, when a built sentence
    /// is still pending, or when the token cap is reached. The last two
    /// report `sentence_ready` so the caller finalizes.
    pub fn add(&mut self, sign: &str, confidence: f32) -> AddOutcome {
        if self.last_sign.as_deref() == Some(sign) {
            return self.outcome(false, false);
        }
        if self.completed.is_some() {
            return self.outcome(false, true);
        }

        let now = self.clock.now_ms();
        let sentence_ready = self.gestures.len() >= self.config.min_gestures
            && self
                .last_time
                .is_some_and(|last| now.saturating_sub(last) > self.config.pause_ms);

        if self.gestures.len() >= self.config.max_gestures {
            debug!(sign, cap = self.config.max_gestures, "sentence: token cap reached");
            return self.outcome(false, true);
        }

        self.gestures.push(SentenceGesture {
            sign: sign.to_string(),
            confidence,
            timestamp_ms: now,
        });
        self.last_time = Some(now);
        self.last_sign = Some(sign.to_string());
        debug!(sign, count = self.gestures.len(), sentence_ready, "sentence: token added");

        self.outcome(true, sentence_ready)
    }

    fn outcome(&self, added: bool, sentence_ready: bool) -> AddOutcome {
        AddOutcome {
            added,
            current_gestures: self.current_gestures(),
            sentence_ready,
        }
    }

    /// Renders the accumulated tokens.
    ///
    /// Returns `None` below the minimum token count. Once built, the
    /// sentence is held until [`SentenceBuilder::clear`]; building again
    /// returns it unchanged.
    pub fn build(&mut self) -> Option<BuiltSentence> {
        if let Some(done) = &self.completed {
            return Some(done.clone());
        }
        if self.gestures.is_empty() || self.gestures.len() < self.config.min_gestures {
            return None;
        }

        let signs = self.current_gestures();
        let total: f32 = self.gestures.iter().map(|g| g.confidence).sum();
        let avg_confidence = (total / self.gestures.len() as f32).round().max(0.0) as u32;

        let (english, swahili) = match find_phrase(&signs) {
            Some(phrase) => (phrase.english.to_string(), phrase.swahili.to_string()),
            None => (
                compose_words(&signs, Language::English),
                compose_words(&signs, Language::Swahili),
            ),
        };

        let sentence = BuiltSentence {
            gestures: signs,
            english,
            swahili,
            avg_confidence,
        };
        info!(
            english = %sentence.english,
            swahili = %sentence.swahili,
            confidence = sentence.avg_confidence,
            "sentence: built"
        );
        self.completed = Some(sentence.clone());
        Some(sentence)
    }

    /// Returns to `Empty`, forgetting tokens, the last sign and the last
    /// timestamp.
    pub fn clear(&mut self) {
        self.gestures.clear();
        self.last_sign = None;
        self.last_time = None;
        self.completed = None;
    }

    pub fn state(&self) -> SentenceState {
        if self.completed.is_some() {
            SentenceState::Completed
        } else if self.gestures.is_empty() {
            SentenceState::Empty
        } else if self.boundary_reached() {
            SentenceState::BoundaryReady
        } else {
            SentenceState::Accumulating
        }
    }

    /// The pending built sentence, if any.
    pub fn completed(&self) -> Option<&BuiltSentence> {
        self.completed.as_ref()
    }

    pub fn current_gestures(&self) -> Vec<String> {
        self.gestures.iter().map(|g| g.sign.clone()).collect()
    }

    pub fn gestures(&self) -> &[SentenceGesture] {
        &self.gestures
    }

    pub fn gesture_count(&self) -> usize {
        self.gestures.len()
    }

    /// Milliseconds since the last accepted token, 0 when there is none.
    pub fn time_since_last_gesture(&self) -> u64 {
        self.last_time
            .map(|last| self.clock.now_ms().saturating_sub(last))
            .unwrap_or(0)
    }

    /// Minimum token count met and the pause has elapsed.
    pub fn boundary_reached(&self) -> bool {
        self.gestures.len() >= self.config.min_gestures
            && self.last_time.is_some()
            && self.time_since_last_gesture() > self.config.pause_ms
    }

    /// Progress toward the pause threshold, 0 to 100.
    pub fn progress_percent(&self) -> f32 {
        if self.gestures.is_empty() {
            return 0.0;
        }
        let ratio = self.time_since_last_gesture() as f32 / self.config.pause_ms as f32;
        (ratio * 100.0).min(100.0)
    }
}

impl Default for SentenceBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl fmt::Debug for SentenceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentenceBuilder")
            .field("config", &self.config)
            .field("gestures", &self.gestures)
            .field("state", &self.state())
            .finish()
    }
}
