//! Pipeline integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ksl_gesture::synth::{hand_with, Pose};
use ksl_gesture::{GestureError, Inference, Landmark, ModelKind, SIGN_CLASSES};
use ksl_sentence::{Language, ManualClock};
use parking_lot::Mutex;

use super::*;

#[derive(Default)]
struct RecordingSpeaker {
    spoken: Mutex<Vec<SpeechRequest>>,
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, request: SpeechRequest) -> Result<(), TranslatorError> {
        self.spoken.lock().push(request);
        Ok(())
    }

    fn stop(&self) {}
}

struct Harness {
    pipeline: Pipeline,
    store: Arc<MemoryStore>,
    speaker: Arc<RecordingSpeaker>,
    prefs: Arc<SharedPreferences>,
    clock: Arc<ManualClock>,
}

fn harness(config: PipelineConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let speaker = Arc::new(RecordingSpeaker::default());
    let prefs = Arc::new(SharedPreferences::default());
    let clock = Arc::new(ManualClock::new(1_000));
    let deps = PipelineDeps::new(store.clone(), speaker.clone(), prefs.clone())
        .with_clock(clock.clone());
    Harness {
        pipeline: Pipeline::new(config, deps),
        store,
        speaker,
        prefs,
        clock,
    }
}

fn seeded() -> PipelineConfig {
    PipelineConfig {
        jitter_seed: Some(7),
        ..Default::default()
    }
}

fn one(pose: Pose) -> Vec<Vec<Landmark>> {
    vec![hand_with(pose, 0.5, 0.5)]
}

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test]
async fn test_empty_frame_produces_nothing() {
    let mut h = harness(seeded());
    let out = h.pipeline.process_frame(&[]);
    assert_eq!(out, FrameOutput::default());
    assert!(h.pipeline.current_sign().is_none());
}

#[tokio::test]
async fn test_single_hand_needs_three_frames() {
    let mut h = harness(seeded());
    let frame = one(Pose::fist());
    assert!(h.pipeline.process_frame(&frame).classification.is_none());
    assert!(h.pipeline.process_frame(&frame).classification.is_none());

    let out = h.pipeline.process_frame(&frame);
    assert_eq!(out.hands, 1);
    let sign = out.classification.unwrap();
    assert_eq!(sign.sign, "A");
    assert!((75.0..90.0).contains(&sign.confidence));
    assert!(!out.sign_added, "sentence mode is off by default");
    assert_eq!(h.pipeline.current_sign().unwrap().sign, "A");
}

#[tokio::test]
async fn test_malformed_hand_is_skipped() {
    let mut h = harness(seeded());
    let bad = vec![vec![Landmark::new(0.1, 0.1, 0.0); 5]];
    for _ in 0..5 {
        let out = h.pipeline.process_frame(&bad);
        assert_eq!(out.hands, 1);
        assert!(out.classification.is_none());
    }
}

#[tokio::test]
async fn test_two_open_hands_close_is_thank_you() {
    let mut h = harness(PipelineConfig {
        two_handed: true,
        ..seeded()
    });
    let frame = vec![hand_with(Pose::open(), 0.45, 0.5), hand_with(Pose::open(), 0.55, 0.5)];
    h.pipeline.process_frame(&frame);
    h.pipeline.process_frame(&frame);
    let sign = h.pipeline.process_frame(&frame).classification.unwrap();
    assert_eq!(sign.sign, "THANK YOU");
    assert!(sign.two_handed);
    assert!((82.0..94.0).contains(&sign.confidence));
}

#[tokio::test]
async fn test_two_handed_mode_falls_back_with_one_hand() {
    let mut h = harness(PipelineConfig {
        two_handed: true,
        ..seeded()
    });
    let frame = one(Pose::open());
    for _ in 0..2 {
        h.pipeline.process_frame(&frame);
    }
    let sign = h.pipeline.process_frame(&frame).classification.unwrap();
    assert_eq!(sign.sign, "FIVE / STOP");
    assert!(!sign.two_handed);
}

#[tokio::test]
async fn test_single_mode_classifies_every_hand() {
    let mut h = harness(seeded());
    let frame = vec![hand_with(Pose::fist(), 0.3, 0.5), hand_with(Pose::fist(), 0.7, 0.5)];
    // Two votes per frame: the window reaches three samples on frame two.
    assert!(h.pipeline.process_frame(&frame).classification.is_none());
    let sign = h.pipeline.process_frame(&frame).classification.unwrap();
    assert_eq!(sign.sign, "A");
}

#[tokio::test(start_paused = true)]
async fn test_auto_save_after_quiet_period() {
    let mut h = harness(seeded());
    let frame = one(Pose::fist());
    for _ in 0..5 {
        h.pipeline.process_frame(&frame);
    }
    assert!(h.pipeline.auto_saver().is_pending());

    wait(2_100).await;
    let records = h.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.text, "A");
    assert!(records[0].record.auto_saved);

    // Holding the same sign does not save it again.
    for _ in 0..5 {
        h.pipeline.process_frame(&frame);
    }
    wait(2_100).await;
    assert_eq!(h.store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sentence_mode_builds_and_speaks() {
    let mut h = harness(PipelineConfig {
        sentence_mode: true,
        ..seeded()
    });
    h.prefs.update(|p| {
        p.auto_play_tts = true;
        p.output_language = Language::Swahili;
    });

    let fist = one(Pose::fist());
    let mut added = 0;
    for _ in 0..4 {
        if h.pipeline.process_frame(&fist).sign_added {
            added += 1;
        }
    }
    assert_eq!(added, 1, "repeats of the same sign are not appended");
    assert_eq!(h.pipeline.snapshot().current_gestures, vec!["A"]);

    h.clock.advance(1_250);
    assert!(h.pipeline.poll_boundary().is_none());
    assert!((h.pipeline.snapshot().progress_percent - 50.0).abs() < 1e-3);

    h.clock.advance(1_300);
    let sentence = h.pipeline.poll_boundary().unwrap();
    assert_eq!(sentence.english, "A");
    assert_eq!(sentence.swahili, "A");

    wait(10).await;
    let spoken = h.speaker.spoken.lock();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].language_tag, "sw-KE");

    let state = h.pipeline.snapshot();
    assert_eq!(state.built_sentence.unwrap().english, "A");
    assert_eq!(state.progress_percent, 100.0);
    assert!(state.sentence_mode);
}

#[tokio::test]
async fn test_complete_and_continue() {
    let mut h = harness(PipelineConfig {
        sentence_mode: true,
        ..seeded()
    });
    for _ in 0..3 {
        h.pipeline.process_frame(&one(Pose::fingers(true, true, false, false)));
    }
    let sentence = h.pipeline.complete_sentence().unwrap();
    assert_eq!(sentence.english, "Two");
    assert_eq!(
        h.pipeline.session().lock().sentence_text(Language::Swahili),
        "Mbili"
    );

    h.pipeline.continue_building();
    assert!(h.pipeline.snapshot().built_sentence.is_none());
    assert!(!h.pipeline.toggle_sentence_mode());
}

#[tokio::test(start_paused = true)]
async fn test_boundary_poller_drives_pipeline_session() {
    let mut h = harness(PipelineConfig {
        sentence_mode: true,
        ..seeded()
    });
    let (poller, mut rx) = h.pipeline.spawn_boundary_poller();

    for _ in 0..3 {
        h.pipeline.process_frame(&one(Pose::open()));
    }
    h.clock.advance(3_000);

    let sentence = rx.recv().await.unwrap();
    assert_eq!(sentence.english, "Five / Stop");
    poller.shutdown().await;
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let mut h = harness(PipelineConfig {
        sentence_mode: true,
        ..seeded()
    });
    for _ in 0..3 {
        h.pipeline.process_frame(&one(Pose::fist()));
    }
    assert!(h.pipeline.current_sign().is_some());

    h.pipeline.reset();
    let state = h.pipeline.snapshot();
    assert!(state.current_sign.is_none());
    assert!(state.current_gestures.is_empty());
    assert!(state.sentence_mode);
    assert!(!h.pipeline.auto_saver().is_pending());

    // Smoothing starts over.
    assert!(h.pipeline.process_frame(&one(Pose::fist())).classification.is_none());
}

#[tokio::test]
async fn test_save_current_is_manual() {
    let mut h = harness(seeded());
    assert_eq!(h.pipeline.save_current().await.unwrap(), None);

    for _ in 0..3 {
        h.pipeline.process_frame(&one(Pose::fist()));
    }
    let id = h.pipeline.save_current().await.unwrap();
    assert_eq!(id, Some(1));
    let record = &h.store.records()[0].record;
    assert_eq!(record.text, "A");
    assert!(!record.auto_saved);
}

struct ArgmaxBackend(&'static str);

impl Inference for ArgmaxBackend {
    fn predict(&self, input: &[f32]) -> Result<Vec<f32>, GestureError> {
        assert_eq!(input.len(), 63);
        let mut probs = vec![0.01; SIGN_CLASSES.len()];
        let idx = SIGN_CLASSES
            .iter()
            .position(|s| *s == self.0)
            .ok_or_else(|| GestureError::Model("unknown label".into()))?;
        probs[idx] = 0.92;
        Ok(probs)
    }
}

#[tokio::test]
async fn test_tensor_model_from_config() {
    let store = Arc::new(MemoryStore::new());
    let deps = PipelineDeps::new(
        store,
        Arc::new(LogSpeaker),
        Arc::new(SharedPreferences::default()),
    )
    .with_inference(Arc::new(ArgmaxBackend("HELLO")));
    let mut pipeline = Pipeline::new(
        PipelineConfig {
            model: ModelKind::Tensor,
            ..Default::default()
        },
        deps,
    );
    assert_eq!(pipeline.model_name(), "tensor");

    let frame = one(Pose::fist());
    pipeline.process_frame(&frame);
    pipeline.process_frame(&frame);
    let sign = pipeline.process_frame(&frame).classification.unwrap();
    assert_eq!(sign.sign, "HELLO");
    assert_eq!(sign.confidence, 92.0);
}

#[test]
fn test_pipeline_config_json_defaults() {
    let cfg: PipelineConfig = serde_json::from_str(r#"{"two_handed":true}"#).unwrap();
    assert!(cfg.two_handed);
    assert_eq!(cfg.model, ModelKind::Rules);
    assert_eq!(cfg.smoothing.window_size, 5);
    assert_eq!(cfg.sentence.pause_ms, 2500);
    assert_eq!(cfg.autosave.debounce_ms, 2000);
    assert!(cfg.jitter_seed.is_none());
}

#[test]
fn test_error_sources_convert() {
    let io: TranslatorError = std::io::Error::other("disk gone").into();
    assert!(matches!(io, TranslatorError::Io(_)));
    assert_eq!(io.to_string(), "translator: io error: disk gone");

    let json: TranslatorError = serde_json::from_str::<TranslationRecord>("{")
        .unwrap_err()
        .into();
    assert!(matches!(json, TranslatorError::Serialization(_)));
    assert!(json.to_string().starts_with("translator: serialization error: "));

    let store = TranslatorError::Store("disk full".into());
    assert_eq!(store.to_string(), "translator: store error: disk full");
}

