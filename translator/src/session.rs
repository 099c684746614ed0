//! Sentence mode state and boundary polling.

use std::sync::Arc;
use std::time::Duration;

use ksl_sentence::{BuiltSentence, Language, SentenceBuilder};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::AutoPlay;

/// UI-facing view of a [`SentenceSession`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub enabled: bool,
    pub current_gestures: Vec<String>,
    pub built_sentence: Option<BuiltSentence>,
    /// A built sentence is on display and waiting for the user.
    pub paused: bool,
    pub progress_percent: f32,
}

/// Result of [`SentenceSession::add_sign`].
#[derive(Debug, Clone, PartialEq)]
pub struct SignAdded {
    pub added: bool,
    /// Set when the sign completed a sentence.
    pub sentence: Option<BuiltSentence>,
}

/// Wraps a [`SentenceBuilder`] with sentence mode on/off, the displayed
/// sentence and boundary progress.
#[derive(Debug)]
pub struct SentenceSession {
    builder: SentenceBuilder,
    enabled: bool,
    built: Option<BuiltSentence>,
    paused: bool,
    progress: f32,
}

impl SentenceSession {
    /// Creates a disabled session.
    pub fn new(builder: SentenceBuilder) -> Self {
        Self {
            builder,
            enabled: false,
            built: None,
            paused: false,
            progress: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    /// Flips sentence mode. Turning it off discards everything.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Feeds a stable sign into the current sentence.
    ///
    /// A sentence still on display is discarded first. When the builder
    /// reports a boundary the sentence is built right away.
    pub fn add_sign(&mut self, sign: &str, confidence: f32) -> SignAdded {
        if !self.enabled {
            return SignAdded {
                added: false,
                sentence: None,
            };
        }

        if self.built.is_some() {
            self.continue_building();
        }

        let outcome = self.builder.add(sign, confidence);
        self.progress = 0.0;

        let sentence = if outcome.sentence_ready {
            self.finish()
        } else {
            None
        };
        SignAdded {
            added: outcome.added,
            sentence,
        }
    }

    /// Updates boundary progress and builds the sentence once the pause
    /// has fully elapsed. Returns the sentence when this call built it.
    pub fn poll_boundary(&mut self) -> Option<BuiltSentence> {
        if !self.enabled || self.builder.gesture_count() == 0 {
            self.progress = 0.0;
            return None;
        }

        if self.builder.time_since_last_gesture() == 0 {
            return None;
        }

        self.progress = self.builder.progress_percent();
        if self.progress >= 100.0 && self.built.is_none() {
            return self.finish();
        }
        None
    }

    /// Builds the sentence now, without waiting for the pause.
    pub fn complete_sentence(&mut self) -> Option<BuiltSentence> {
        self.finish()
    }

    fn finish(&mut self) -> Option<BuiltSentence> {
        let sentence = self.builder.build()?;
        self.built = Some(sentence.clone());
        self.paused = true;
        Some(sentence)
    }

    /// Dismisses the displayed sentence and starts a new one.
    pub fn continue_building(&mut self) {
        self.builder.clear();
        self.built = None;
        self.paused = false;
        self.progress = 0.0;
    }

    /// Clears everything; sentence mode stays as it is.
    pub fn reset(&mut self) {
        self.continue_building();
    }

    /// Text of the displayed sentence, empty when there is none.
    pub fn sentence_text(&self, language: Language) -> String {
        self.built
            .as_ref()
            .map(|s| s.text(language).to_string())
            .unwrap_or_default()
    }

    pub fn built_sentence(&self) -> Option<&BuiltSentence> {
        self.built.as_ref()
    }

    pub fn current_gestures(&self) -> Vec<String> {
        self.builder.current_gestures()
    }

    pub fn gesture_count(&self) -> usize {
        self.builder.gesture_count()
    }

    pub fn progress_percent(&self) -> f32 {
        self.progress
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn builder(&self) -> &SentenceBuilder {
        &self.builder
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            enabled: self.enabled,
            current_gestures: self.current_gestures(),
            built_sentence: self.built.clone(),
            paused: self.paused,
            progress_percent: self.progress,
        }
    }
}

/// Drives [`SentenceSession::poll_boundary`] on a fixed interval.
///
/// Built sentences are sent on the channel returned by
/// [`BoundaryPoller::spawn`] and, when given, handed to [`AutoPlay`]. The
/// task stops on [`BoundaryPoller::stop`], on drop, or when the receiver
/// is dropped.
pub struct BoundaryPoller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl BoundaryPoller {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn spawn(
        session: Arc<Mutex<SentenceSession>>,
        interval: Duration,
        auto_play: Option<AutoPlay>,
    ) -> (Self, mpsc::Receiver<BuiltSentence>) {
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let built = session.lock().poll_boundary();
                        let Some(sentence) = built else { continue };
                        debug!(english = %sentence.english, "session: boundary reached");
                        if let Some(play) = &auto_play {
                            play.play_sentence(sentence.clone());
                        }
                        if tx.send(sentence).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("session: boundary poller stopped");
        });

        (
            Self {
                cancel,
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stops the task and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for BoundaryPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksl_sentence::{BuilderConfig, ManualClock};

    fn session() -> (SentenceSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let builder = SentenceBuilder::with_clock(BuilderConfig::default(), clock.clone());
        let mut s = SentenceSession::new(builder);
        s.toggle();
        (s, clock)
    }

    #[test]
    fn disabled_session_ignores_signs() {
        let clock = Arc::new(ManualClock::new(0));
        let mut s = SentenceSession::new(SentenceBuilder::with_clock(
            BuilderConfig::default(),
            clock,
        ));
        assert!(!s.is_enabled());
        assert!(!s.add_sign("HELLO", 80.0).added);
        assert_eq!(s.gesture_count(), 0);
    }

    #[test]
    fn poll_tracks_progress_and_builds() {
        let (mut s, clock) = session();
        s.add_sign("I", 80.0);
        s.add_sign("HAPPY", 90.0);

        clock.advance(1_000);
        assert!(s.poll_boundary().is_none());
        assert!((s.progress_percent() - 40.0).abs() < 1e-4);

        clock.advance(1_500);
        let sentence = s.poll_boundary().unwrap();
        assert_eq!(sentence.english, "I am happy");
        assert!(s.is_paused());
        assert_eq!(s.progress_percent(), 100.0);
        assert_eq!(s.sentence_text(Language::Swahili), "Mimi nafurahi");

        // Already built: later polls do not rebuild.
        clock.advance(1_000);
        assert!(s.poll_boundary().is_none());
    }

    #[test]
    fn adding_after_sentence_starts_fresh() {
        let (mut s, clock) = session();
        s.add_sign("HELLO", 80.0);
        clock.advance(3_000);
        s.poll_boundary().unwrap();

        let out = s.add_sign("HELLO", 85.0);
        assert!(out.added);
        assert!(out.sentence.is_none());
        assert!(s.built_sentence().is_none());
        assert!(!s.is_paused());
        assert_eq!(s.current_gestures(), vec!["HELLO"]);
    }

    #[test]
    fn long_pause_builds_on_next_sign() {
        let (mut s, clock) = session();
        s.add_sign("HELLO", 80.0);
        clock.advance(2_600);
        let out = s.add_sign("YOU", 80.0);
        assert!(out.added);
        let sentence = out.sentence.unwrap();
        assert_eq!(sentence.gestures, vec!["HELLO", "YOU"]);
        assert!(s.is_paused());
    }

    #[test]
    fn complete_continue_and_toggle() {
        let (mut s, _) = session();
        assert!(s.complete_sentence().is_none());
        s.add_sign("THANK YOU", 80.0);
        let sentence = s.complete_sentence().unwrap();
        assert_eq!(sentence.english, "Thank you");
        assert_eq!(s.sentence_text(Language::English), "Thank you");

        s.continue_building();
        assert_eq!(s.sentence_text(Language::English), "");
        assert_eq!(s.gesture_count(), 0);

        s.add_sign("MORE", 80.0);
        assert!(!s.toggle());
        assert_eq!(s.gesture_count(), 0);
        let state = s.snapshot();
        assert!(!state.enabled);
        assert!(state.current_gestures.is_empty());
        assert_eq!(state.progress_percent, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_publishes_built_sentence() {
        let (s, clock) = session();
        let session = Arc::new(Mutex::new(s));
        session.lock().add_sign("HELLO", 80.0);

        let (poller, mut rx) =
            BoundaryPoller::spawn(session.clone(), BoundaryPoller::DEFAULT_INTERVAL, None);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(rx.try_recv().is_err());

        clock.advance(2_600);
        let sentence = rx.recv().await.unwrap();
        assert_eq!(sentence.english, "Hello");
        assert!(session.lock().is_paused());

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn poller_stops_on_cancel() {
        let (s, clock) = session();
        let session = Arc::new(Mutex::new(s));
        let (poller, mut rx) =
            BoundaryPoller::spawn(session.clone(), BoundaryPoller::DEFAULT_INTERVAL, None);
        poller.stop();

        session.lock().add_sign("HELLO", 80.0);
        clock.advance(5_000);
        // The sender is dropped when the task exits.
        assert!(rx.recv().await.is_none());
        assert!(session.lock().built_sentence().is_none());
    }
}
