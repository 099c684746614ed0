//! Debounced auto-save of stable signs.
//!
//! # Behavior
//!
//! Every stabilized classification goes through [`AutoSaver::auto_save`]:
//!
//! 1. Count consecutive calls with the same sign.
//! 2. Cancel the pending timer, if any.
//! 3. Stop here if confidence is below the threshold or the sign is the
//!    one saved last.
//! 4. After enough consecutive calls, arm a timer.
//!
//! When the timer fires the record is written. A new call before then
//! restarts the wait, so a sign is saved once the stream of results has
//! been quiet for the debounce period.

use std::sync::Arc;
use std::time::Duration;

use ksl_gesture::Classification;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{TranslationRecord, TranslationStore};

/// Configuration for [`AutoSaver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Minimum confidence in percent (default: 60).
    pub min_confidence: f32,
    /// Consecutive identical results before a save is armed (default: 3).
    pub stable_count: u32,
    /// Quiet period before writing (default: 2000 ms).
    pub debounce_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            min_confidence: 60.0,
            stable_count: 3,
            debounce_ms: 2000,
        }
    }
}

#[derive(Default)]
struct State {
    stable_sign: Option<String>,
    stable_count: u32,
    last_saved: Option<String>,
    /// Bumped on every cancel; a timer only fires for its own generation.
    generation: u64,
    /// Bumped on reset; a write started before a reset does not record
    /// itself as last saved.
    epoch: u64,
    pending: Option<JoinHandle<()>>,
    saving: bool,
}

impl State {
    fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Saves stable, confident signs to a [`TranslationStore`].
///
/// At most one timer is outstanding. Must be used inside a Tokio runtime.
#[derive(Clone)]
pub struct AutoSaver {
    store: Arc<dyn TranslationStore>,
    config: AutoSaveConfig,
    state: Arc<Mutex<State>>,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn TranslationStore>, config: AutoSaveConfig) -> Self {
        Self {
            store,
            config,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.config
    }

    /// Offers a stabilized classification.
    pub fn auto_save(&self, result: &Classification) {
        let mut state = self.state.lock();

        if state.stable_sign.as_deref() == Some(result.sign.as_str()) {
            state.stable_count += 1;
        } else {
            state.stable_sign = Some(result.sign.clone());
            state.stable_count = 1;
        }

        state.cancel();

        if result.confidence < self.config.min_confidence {
            return;
        }
        if state.last_saved.as_deref() == Some(result.sign.as_str()) {
            return;
        }
        if state.stable_count < self.config.stable_count {
            return;
        }

        let generation = state.generation;
        let epoch = state.epoch;
        debug!(sign = %result.sign, count = state.stable_count, "autosave: armed");
        state.pending = Some(tokio::spawn(fire(
            self.store.clone(),
            self.state.clone(),
            generation,
            epoch,
            Duration::from_millis(self.config.debounce_ms),
            result.sign.clone(),
            result.confidence,
        )));
    }

    /// Forgets the last saved sign and the run counter, and cancels the
    /// pending timer.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.cancel();
        state.epoch += 1;
        state.last_saved = None;
        state.stable_sign = None;
        state.stable_count = 0;
    }

    pub fn last_saved(&self) -> Option<String> {
        self.state.lock().last_saved.clone()
    }

    /// A write is in progress.
    pub fn is_saving(&self) -> bool {
        self.state.lock().saving
    }

    /// A timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

async fn fire(
    store: Arc<dyn TranslationStore>,
    state: Arc<Mutex<State>>,
    generation: u64,
    epoch: u64,
    delay: Duration,
    sign: String,
    confidence: f32,
) {
    tokio::time::sleep(delay).await;

    let record = {
        let mut state = state.lock();
        if state.generation != generation {
            return;
        }
        // Detach: from here on a cancel must not abort the write.
        state.pending = None;
        if state.last_saved.as_deref() == Some(sign.as_str()) {
            return;
        }
        state.saving = true;
        TranslationRecord::auto_saved(sign.clone(), confidence)
    };

    let result = store.insert(record).await;

    let mut state = state.lock();
    state.saving = false;
    match result {
        Ok(id) => {
            info!(sign = %sign, id, "autosave: saved");
            if state.epoch == epoch {
                state.last_saved = Some(sign);
            }
        }
        Err(err) => warn!(sign = %sign, error = %err, "autosave: save failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, TranslatorError};
    use async_trait::async_trait;

    fn c(sign: &str, confidence: f32) -> Classification {
        Classification::new(sign, confidence)
    }

    fn saver() -> (AutoSaver, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AutoSaver::new(store.clone(), AutoSaveConfig::default()), store)
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn saves_once_after_debounce() {
        let (saver, store) = saver();
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.4));
        }
        assert!(saver.is_pending());

        wait(1_999).await;
        assert!(store.is_empty());

        wait(2).await;
        let records = store.records();
        assert_eq!(records.len(), 1);
        let record = &records[0].record;
        assert_eq!(record.text, "HELLO");
        assert_eq!(record.confidence, 80);
        assert!(record.auto_saved);
        assert!(!record.is_favorite);
        assert!(!record.synced);
        assert_eq!(saver.last_saved().as_deref(), Some("HELLO"));
        assert!(!saver.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn needs_three_in_a_row() {
        let (saver, store) = saver();
        saver.auto_save(&c("HELLO", 80.0));
        saver.auto_save(&c("HELLO", 80.0));
        assert!(!saver.is_pending());
        wait(5_000).await;
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn low_confidence_cancels_and_skips() {
        let (saver, store) = saver();
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        saver.auto_save(&c("HELLO", 59.9));
        assert!(!saver.is_pending());
        wait(5_000).await;
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_result_restarts_the_wait() {
        let (saver, store) = saver();
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        wait(1_500).await;
        saver.auto_save(&c("HELLO", 80.0));
        wait(1_500).await;
        assert!(store.is_empty());
        wait(600).await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn different_sign_resets_counter() {
        let (saver, store) = saver();
        saver.auto_save(&c("HELLO", 80.0));
        saver.auto_save(&c("HELLO", 80.0));
        saver.auto_save(&c("A", 80.0));
        saver.auto_save(&c("HELLO", 80.0));
        wait(5_000).await;
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn same_sign_not_saved_twice() {
        let (saver, store) = saver();
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        wait(2_100).await;
        for _ in 0..5 {
            saver.auto_save(&c("HELLO", 90.0));
        }
        assert!(!saver.is_pending());
        wait(5_000).await;
        assert_eq!(store.len(), 1);

        for _ in 0..3 {
            saver.auto_save(&c("A", 75.0));
        }
        wait(2_100).await;
        assert_eq!(store.len(), 2);
        assert_eq!(saver.last_saved().as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_and_forgets() {
        let (saver, store) = saver();
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        saver.reset();
        assert!(!saver.is_pending());
        wait(5_000).await;
        assert!(store.is_empty());

        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        wait(2_100).await;
        assert_eq!(store.len(), 1);

        saver.reset();
        assert!(saver.last_saved().is_none());
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        wait(2_100).await;
        assert_eq!(store.len(), 2);
    }

    struct FailingStore;

    #[async_trait]
    impl TranslationStore for FailingStore {
        async fn insert(&self, _record: TranslationRecord) -> Result<u64, TranslatorError> {
            Err(TranslatorError::Store("disk full".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failure_leaves_state_unchanged() {
        let saver = AutoSaver::new(Arc::new(FailingStore), AutoSaveConfig::default());
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        wait(2_100).await;
        assert!(saver.last_saved().is_none());
        assert!(!saver.is_saving());
    }

    struct SlowStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl TranslationStore for SlowStore {
        async fn insert(&self, record: TranslationRecord) -> Result<u64, TranslatorError> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            self.inner.insert(record).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_write_survives_cancel() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
        });
        let saver = AutoSaver::new(store.clone(), AutoSaveConfig::default());
        for _ in 0..3 {
            saver.auto_save(&c("HELLO", 80.0));
        }
        wait(2_100).await;
        assert!(saver.is_saving());

        // A new result mid-write only resets counters.
        saver.auto_save(&c("A", 80.0));
        wait(1_000).await;
        assert_eq!(store.inner.len(), 1);
        assert!(!saver.is_saving());
        assert_eq!(saver.last_saved().as_deref(), Some("HELLO"));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_thresholds() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(
            store.clone(),
            AutoSaveConfig {
                min_confidence: 90.0,
                stable_count: 1,
                debounce_ms: 100,
            },
        );
        saver.auto_save(&c("HELLO", 85.0));
        wait(200).await;
        assert!(store.is_empty());
        saver.auto_save(&c("HELLO", 95.0));
        wait(200).await;
        assert_eq!(store.len(), 1);
    }
}
