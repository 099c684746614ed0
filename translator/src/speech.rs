//! Speech output.
//!
//! [`Speaker`] is the sink for synthesized speech. [`AutoPlay`] decides
//! whether a translation should be spoken at all, based on the current
//! [`Preferences`](crate::Preferences).

use std::sync::Arc;

use async_trait::async_trait;
use ksl_sentence::{BuiltSentence, Language};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{PreferenceProvider, TranslatorError};

/// One utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    /// `"en-US"` or `"sw-KE"`.
    pub language_tag: String,
    pub rate: f32,
    pub volume: f32,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, language: Language, rate: f32, volume: f32) -> Self {
        Self {
            text: text.into(),
            language_tag: language.tts_tag().to_string(),
            rate,
            volume,
        }
    }
}

/// A speech synthesis backend.
///
/// `speak` resolves when playback finishes. `stop` interrupts playback and
/// must return immediately, even while `speak` is starting.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, request: SpeechRequest) -> Result<(), TranslatorError>;
    fn stop(&self);
}

/// Writes utterances to the log instead of playing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&self, request: SpeechRequest) -> Result<(), TranslatorError> {
        info!(
            text = %request.text,
            lang = %request.language_tag,
            rate = request.rate,
            volume = request.volume,
            "speech: speak"
        );
        Ok(())
    }

    fn stop(&self) {
        debug!("speech: stop");
    }
}

#[derive(Default)]
struct PlayState {
    playing: bool,
    last_spoken: Option<String>,
}

/// Speaks translations automatically when the user enabled it.
///
/// Skips a request while another is playing and never repeats the text it
/// spoke last.
#[derive(Clone)]
pub struct AutoPlay {
    speaker: Arc<dyn Speaker>,
    preferences: Arc<dyn PreferenceProvider>,
    state: Arc<Mutex<PlayState>>,
}

impl AutoPlay {
    pub fn new(speaker: Arc<dyn Speaker>, preferences: Arc<dyn PreferenceProvider>) -> Self {
        Self {
            speaker,
            preferences,
            state: Arc::new(Mutex::new(PlayState::default())),
        }
    }

    /// Speaks `text` in the preferred output language.
    ///
    /// Returns true if the text was spoken to completion.
    pub async fn speak_translation(&self, text: &str) -> bool {
        let prefs = self.preferences.preferences();
        if !prefs.auto_play_tts {
            return false;
        }

        {
            let mut state = self.state.lock();
            if state.playing || state.last_spoken.as_deref() == Some(text) {
                return false;
            }
            state.playing = true;
            state.last_spoken = Some(text.to_string());
        }

        let request = SpeechRequest::new(
            text,
            prefs.output_language,
            prefs.speech_rate,
            prefs.volume,
        );
        let result = self.speaker.speak(request).await;
        self.state.lock().playing = false;

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "speech: auto-play failed");
                false
            }
        }
    }

    /// Speaks a built sentence in the preferred output language.
    pub async fn speak_sentence(&self, sentence: &BuiltSentence) -> bool {
        let language = self.preferences.preferences().output_language;
        self.speak_translation(sentence.text(language)).await
    }

    /// Spawns [`AutoPlay::speak_sentence`] on the runtime.
    pub fn play_sentence(&self, sentence: BuiltSentence) -> JoinHandle<bool> {
        let this = self.clone();
        tokio::spawn(async move { this.speak_sentence(&sentence).await })
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Interrupts playback.
    pub fn stop(&self) {
        self.speaker.stop();
        self.state.lock().playing = false;
    }

    /// Interrupts playback and forgets the last spoken text.
    pub fn reset(&self) {
        self.speaker.stop();
        let mut state = self.state.lock();
        state.playing = false;
        state.last_spoken = None;
    }
}
