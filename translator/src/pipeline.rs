//! Per-frame processing.
//!
//! ```text
//! hands ──► SignModel ──────────► single buffer ──┐
//!   │                                             ├──► current sign
//!   └─(2 hands, two-handed mode)─► TwoHand ──► pair buffer ──┘    │
//!                                                      ┌──────────┼──────────┐
//!                                                      ▼          ▼          ▼
//!                                                  session    auto-save   auto-play
//! ```
//!
//! Frames must be fed in arrival order from one source.

use std::sync::Arc;

use ksl_gesture::{
    Classification, GestureBuffer, Inference, Jitter, Landmark, ModelKind, RuleClassifier,
    SignModel, SmoothingConfig, TwoHandClassifier,
};
use ksl_sentence::{BuilderConfig, BuiltSentence, Clock, SentenceBuilder, SystemClock};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    AutoPlay, AutoSaveConfig, AutoSaver, BoundaryPoller, PreferenceProvider, SentenceSession,
    Speaker, TranslationRecord, TranslationStore, TranslatorError,
};

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model: ModelKind,
    /// Classify two-hand frames as compound signs.
    pub two_handed: bool,
    /// Start with sentence mode on.
    pub sentence_mode: bool,
    pub smoothing: SmoothingConfig,
    pub sentence: BuilderConfig,
    pub autosave: AutoSaveConfig,
    /// Fixes the classifier confidence jitter, for reproducible replays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Rules,
            two_handed: false,
            sentence_mode: false,
            smoothing: SmoothingConfig::default(),
            sentence: BuilderConfig::default(),
            autosave: AutoSaveConfig::default(),
            jitter_seed: None,
        }
    }
}

/// Collaborators a [`Pipeline`] talks to.
#[derive(Clone)]
pub struct PipelineDeps {
    pub store: Arc<dyn TranslationStore>,
    pub speaker: Arc<dyn Speaker>,
    pub preferences: Arc<dyn PreferenceProvider>,
    pub clock: Arc<dyn Clock>,
    pub inference: Option<Arc<dyn Inference>>,
}

impl PipelineDeps {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        speaker: Arc<dyn Speaker>,
        preferences: Arc<dyn PreferenceProvider>,
    ) -> Self {
        Self {
            store,
            speaker,
            preferences,
            clock: Arc::new(SystemClock),
            inference: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_inference(mut self, inference: Arc<dyn Inference>) -> Self {
        self.inference = Some(inference);
        self
    }
}

/// What one frame produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameOutput {
    /// Number of hands in the frame.
    pub hands: usize,
    /// Smoothed result, if the window agreed on one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    /// The result was appended to the current sentence.
    pub sign_added: bool,
    /// A sentence completed on this frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence: Option<BuiltSentence>,
}

/// UI-facing snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    pub current_sign: Option<Classification>,
    pub current_gestures: Vec<String>,
    pub built_sentence: Option<BuiltSentence>,
    pub progress_percent: f32,
    pub sentence_mode: bool,
}

/// Turns landmark frames into signs, sentences, saved records and speech.
///
/// Must be used inside a Tokio runtime: saving and speaking run as tasks.
pub struct Pipeline {
    config: PipelineConfig,
    model: Arc<dyn SignModel>,
    two_hand: TwoHandClassifier,
    single_buffer: GestureBuffer,
    pair_buffer: GestureBuffer,
    session: Arc<Mutex<SentenceSession>>,
    auto_saver: AutoSaver,
    auto_play: AutoPlay,
    store: Arc<dyn TranslationStore>,
    current: Option<Classification>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, deps: PipelineDeps) -> Self {
        let rules = RuleClassifier::new(Jitter::from_seed(config.jitter_seed));
        let model = config.model.build(rules, deps.inference.clone());
        // Offset so the two classifiers do not draw the same sequence.
        let two_hand = TwoHandClassifier::new(Jitter::from_seed(
            config.jitter_seed.map(|s| s.wrapping_add(1)),
        ));

        let builder = SentenceBuilder::with_clock(config.sentence, deps.clock.clone());
        let mut session = SentenceSession::new(builder);
        session.set_enabled(config.sentence_mode);

        info!(
            model = model.name(),
            two_handed = config.two_handed,
            sentence_mode = config.sentence_mode,
            "pipeline: ready"
        );

        Self {
            model,
            two_hand,
            single_buffer: GestureBuffer::with_config(config.smoothing),
            pair_buffer: GestureBuffer::with_config(config.smoothing),
            session: Arc::new(Mutex::new(session)),
            auto_saver: AutoSaver::new(deps.store.clone(), config.autosave),
            auto_play: AutoPlay::new(deps.speaker, deps.preferences),
            store: deps.store,
            current: None,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Processes one frame of zero or more hands.
    ///
    /// Index 0 is treated as the left hand and index 1 as the right.
    pub fn process_frame(&mut self, hands: &[Vec<Landmark>]) -> FrameOutput {
        let mut output = FrameOutput {
            hands: hands.len(),
            ..Default::default()
        };
        if hands.is_empty() {
            return output;
        }

        let smoothed = if self.config.two_handed && hands.len() == 2 {
            self.two_hand
                .classify(&hands[0], &hands[1])
                .and_then(|c| self.pair_buffer.add(c))
        } else {
            let mut last = None;
            for hand in hands {
                if let Some(c) = self.model.classify(hand) {
                    if let Some(s) = self.single_buffer.add(c) {
                        last = Some(s);
                    }
                }
            }
            last
        };

        let Some(result) = smoothed else {
            return output;
        };

        if self.current.as_ref().map(|c| c.sign.as_str()) != Some(result.sign.as_str()) {
            debug!(sign = %result.sign, confidence = result.confidence, "pipeline: sign changed");
        }
        self.current = Some(result.clone());

        let added = self.session.lock().add_sign(&result.sign, result.confidence);
        output.sign_added = added.added;
        if let Some(sentence) = added.sentence {
            self.auto_play.play_sentence(sentence.clone());
            output.sentence = Some(sentence);
        }

        self.auto_saver.auto_save(&result);
        output.classification = Some(result);
        output
    }

    /// Checks the sentence boundary once. Replays call this between frames;
    /// live use runs a [`BoundaryPoller`] instead.
    pub fn poll_boundary(&self) -> Option<BuiltSentence> {
        let sentence = self.session.lock().poll_boundary()?;
        self.auto_play.play_sentence(sentence.clone());
        Some(sentence)
    }

    /// Starts the periodic boundary check.
    pub fn spawn_boundary_poller(
        &self,
    ) -> (BoundaryPoller, tokio::sync::mpsc::Receiver<BuiltSentence>) {
        BoundaryPoller::spawn(
            self.session.clone(),
            BoundaryPoller::DEFAULT_INTERVAL,
            Some(self.auto_play.clone()),
        )
    }

    /// Builds the current sentence without waiting for the pause.
    pub fn complete_sentence(&self) -> Option<BuiltSentence> {
        let sentence = self.session.lock().complete_sentence()?;
        self.auto_play.play_sentence(sentence.clone());
        Some(sentence)
    }

    pub fn continue_building(&self) {
        self.session.lock().continue_building();
    }

    /// Flips sentence mode and returns the new setting.
    pub fn toggle_sentence_mode(&self) -> bool {
        self.session.lock().toggle()
    }

    /// Saves the current sign to history on explicit request.
    pub async fn save_current(&self) -> Result<Option<u64>, TranslatorError> {
        let Some(current) = self.current.clone() else {
            return Ok(None);
        };
        let id = self
            .store
            .insert(TranslationRecord::manual(current.sign, current.confidence))
            .await?;
        Ok(Some(id))
    }

    pub fn current_sign(&self) -> Option<&Classification> {
        self.current.as_ref()
    }

    pub fn session(&self) -> &Arc<Mutex<SentenceSession>> {
        &self.session
    }

    pub fn auto_saver(&self) -> &AutoSaver {
        &self.auto_saver
    }

    pub fn auto_play(&self) -> &AutoPlay {
        &self.auto_play
    }

    pub fn snapshot(&self) -> PipelineState {
        let session = self.session.lock();
        PipelineState {
            current_sign: self.current.clone(),
            current_gestures: session.current_gestures(),
            built_sentence: session.built_sentence().cloned(),
            progress_percent: session.progress_percent(),
            sentence_mode: session.is_enabled(),
        }
    }

    /// Clears smoothing, the current sentence, auto-save state and speech.
    pub fn reset(&mut self) {
        self.single_buffer.clear();
        self.pair_buffer.clear();
        self.current = None;
        self.session.lock().reset();
        self.auto_saver.reset();
        self.auto_play.reset();
    }
}
