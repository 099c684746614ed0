//! Replays landmark frames through the recognition pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Args;
use ksl_gesture::synth::{hand_with, Pose};
use ksl_gesture::Landmark;
use ksl_sentence::{BuiltSentence, Language, ManualClock};
use ksl_translator::{
    JsonlStore, LogSpeaker, MemoryStore, Pipeline, PipelineConfig, PipelineDeps, Preferences,
    SharedPreferences, StoredRecord, TranslationRecord, TranslationStore, TranslatorError,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{emit, get_config, note, read_document, verbose};
use crate::Cli;

/// Frame spacing assumed when a recording has no timestamps (~30 fps).
pub const FRAME_INTERVAL_MS: u64 = 33;

/// Replay recorded landmark frames through the pipeline.
///
/// The recording is a YAML or JSON list of frames:
///
///   - timestamp_ms: 0
///     hands:
///       - [{x: 0.5, y: 0.6, z: 0.0}, ...21 points]
///
/// Frames without `timestamp_ms` are spaced 33 ms apart. Use --demo to
/// replay a built-in synthetic sequence instead.
#[derive(Args)]
pub struct ReplayCommand {
    /// Recorded frames file (YAML or JSON)
    #[arg(short = 'f', long, required_unless_present = "demo")]
    file: Option<String>,

    /// Replay the built-in synthetic sequence
    #[arg(long, conflicts_with = "file")]
    demo: bool,

    /// Enable two-handed signs
    #[arg(long)]
    two_handed: bool,

    /// Enable sentence mode
    #[arg(long)]
    sentence: bool,

    /// Output language (english, swahili); default from config
    #[arg(short = 'l', long)]
    lang: Option<String>,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Seed for classifier confidence jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Keep saved translations in memory instead of the history file
    #[arg(long)]
    no_save: bool,
}

/// One frame of a recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub hands: Vec<Vec<Landmark>>,
}

/// A change of the current sign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignEvent {
    pub at_ms: u64,
    pub sign: String,
    pub confidence: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub two_handed: bool,
}

/// A sentence that completed during the replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceEvent {
    pub at_ms: u64,
    pub gestures: Vec<String>,
    pub english: String,
    pub swahili: String,
    pub avg_confidence: u32,
}

impl SentenceEvent {
    fn new(at_ms: u64, sentence: BuiltSentence) -> Self {
        Self {
            at_ms,
            gestures: sentence.gestures,
            english: sentence.english,
            swahili: sentence.swahili,
            avg_confidence: sentence.avg_confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub model: String,
    pub frames: usize,
    pub duration_ms: u64,
    pub signs: Vec<SignEvent>,
    pub sentences: Vec<SentenceEvent>,
    pub saved: Vec<StoredRecord>,
}

/// Playback settings independent of the pipeline configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub speed: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl ReplayOptions {
    fn scale(&self, ms: u64) -> Duration {
        Duration::from_secs_f64(ms as f64 / 1000.0 / self.speed)
    }
}

impl ReplayCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        if !(self.speed > 0.0 && self.speed.is_finite()) {
            anyhow::bail!("speed must be a positive number");
        }

        let cfg = get_config(cli)?;
        let mut pipeline = cfg.pipeline.clone();
        pipeline.two_handed |= self.two_handed;
        pipeline.sentence_mode |= self.sentence;
        if self.seed.is_some() {
            pipeline.jitter_seed = self.seed;
        }

        let mut prefs = cfg.preferences.clone();
        if let Some(lang) = &self.lang {
            prefs.output_language = Language::parse(lang)
                .ok_or_else(|| anyhow::anyhow!("unknown language '{}'", lang))?;
        }

        let frames = if self.demo {
            demo_frames(pipeline.two_handed)
        } else {
            let path = self
                .file
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("frames file is required, use -f flag"))?;
            read_document::<Vec<RecordedFrame>>(path)?
        };
        verbose(cli, &format!("Loaded {} frames", frames.len()));

        let store: Arc<dyn TranslationStore> = if self.no_save {
            Arc::new(MemoryStore::new())
        } else {
            let path = cfg.history_path();
            verbose(cli, &format!("History: {}", path.display()));
            Arc::new(JsonlStore::open(&path).await?)
        };

        let options = ReplayOptions { speed: self.speed };
        let report = replay(frames, pipeline, prefs, store, options).await?;

        note(&format!(
            "{} frames, {} sign changes, {} sentences, {} saved",
            report.frames,
            report.signs.len(),
            report.sentences.len(),
            report.saved.len()
        ));
        emit(cli, &report)
    }
}

/// Captures what the auto-saver writes while passing it through.
struct RecordingStore {
    inner: Arc<dyn TranslationStore>,
    saved: Mutex<Vec<StoredRecord>>,
}

#[async_trait]
impl TranslationStore for RecordingStore {
    async fn insert(&self, record: TranslationRecord) -> Result<u64, TranslatorError> {
        let id = self.inner.insert(record.clone()).await?;
        self.saved.lock().await.push(StoredRecord { id, record });
        Ok(id)
    }
}

/// Drives a pipeline with the given frames.
///
/// Sentence timing follows the recorded timestamps. Wall-clock waits and
/// the auto-save quiet period are divided by `options.speed`. The end of
/// the recording counts as a pause.
pub async fn replay(
    frames: Vec<RecordedFrame>,
    mut config: PipelineConfig,
    preferences: Preferences,
    store: Arc<dyn TranslationStore>,
    options: ReplayOptions,
) -> anyhow::Result<ReplayReport> {
    let debounce = options.scale(config.autosave.debounce_ms);
    config.autosave.debounce_ms = (debounce.as_millis() as u64).max(1);
    let pause_ms = config.sentence.pause_ms;

    let recorder = Arc::new(RecordingStore {
        inner: store,
        saved: Mutex::new(Vec::new()),
    });
    let clock = Arc::new(ManualClock::new(0));
    let deps = PipelineDeps::new(
        recorder.clone(),
        Arc::new(LogSpeaker),
        Arc::new(SharedPreferences::new(preferences)),
    )
    .with_clock(clock.clone());
    let mut pipeline = Pipeline::new(config, deps);

    let mut signs: Vec<SignEvent> = Vec::new();
    let mut sentences = Vec::new();
    let mut prev_ts: Option<u64> = None;
    let mut first_ts = 0;

    for frame in &frames {
        let ts = match (frame.timestamp_ms, prev_ts) {
            (Some(ts), _) => ts,
            (None, Some(prev)) => prev + FRAME_INTERVAL_MS,
            (None, None) => 0,
        };
        match prev_ts {
            Some(prev) => tokio::time::sleep(options.scale(ts.saturating_sub(prev))).await,
            None => first_ts = ts,
        }
        clock.set(ts);
        prev_ts = Some(ts);

        if let Some(sentence) = pipeline.poll_boundary() {
            sentences.push(SentenceEvent::new(ts, sentence));
        }

        let out = pipeline.process_frame(&frame.hands);
        if let Some(c) = &out.classification {
            if signs.last().map(|e| e.sign.as_str()) != Some(c.sign.as_str()) {
                signs.push(SignEvent {
                    at_ms: ts,
                    sign: c.sign.clone(),
                    confidence: c.confidence.round() as u32,
                    two_handed: c.two_handed,
                });
            }
        }
        if let Some(sentence) = out.sentence {
            sentences.push(SentenceEvent::new(ts, sentence));
        }
    }

    let last_ts = prev_ts.unwrap_or(0);
    let end = last_ts + pause_ms + 1;
    clock.set(end);
    if let Some(sentence) = pipeline.poll_boundary() {
        sentences.push(SentenceEvent::new(end, sentence));
    }

    // Let a pending auto-save land before reporting.
    let saver = pipeline.auto_saver().clone();
    let settle = async {
        while saver.is_pending() || saver.is_saving() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    if tokio::time::timeout(debounce + Duration::from_secs(5), settle)
        .await
        .is_err()
    {
        tracing::warn!("replay: auto-save did not settle");
    }

    let saved = recorder.saved.lock().await.clone();
    Ok(ReplayReport {
        model: pipeline.model_name().to_string(),
        frames: frames.len(),
        duration_ms: last_ts.saturating_sub(first_ts),
        signs,
        sentences,
        saved,
    })
}

enum Segment {
    Hold(Vec<Vec<Landmark>>, usize),
    Empty(u64),
}

/// A short synthetic session: "THANK YOU" (two-handed mode only), a pause,
/// "I / SMALL" then "GOOD / YES", and a closing pause.
pub fn demo_frames(two_handed: bool) -> Vec<RecordedFrame> {
    const HOLD: usize = 15;
    const PAUSE_MS: u64 = 3_000;

    let mut segments = Vec::new();
    if two_handed {
        let thank_you = vec![
            hand_with(Pose::open(), 0.45, 0.5),
            hand_with(Pose::open(), 0.55, 0.5),
        ];
        segments.push(Segment::Hold(thank_you, HOLD));
        segments.push(Segment::Empty(PAUSE_MS));
    }
    let small = Pose::fingers(false, false, false, true);
    segments.push(Segment::Hold(vec![hand_with(small, 0.5, 0.5)], HOLD));
    segments.push(Segment::Hold(
        vec![hand_with(small.with_thumb(true), 0.5, 0.5)],
        HOLD,
    ));
    segments.push(Segment::Empty(PAUSE_MS));

    let mut frames = Vec::new();
    let mut ts = 0;
    for segment in segments {
        let (hands, count) = match segment {
            Segment::Hold(hands, count) => (hands, count),
            Segment::Empty(ms) => (Vec::new(), (ms / FRAME_INTERVAL_MS) as usize),
        };
        for _ in 0..count {
            frames.push(RecordedFrame {
                timestamp_ms: Some(ts),
                hands: hands.clone(),
            });
            ts += FRAME_INTERVAL_MS;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(two_handed: bool) -> PipelineConfig {
        PipelineConfig {
            two_handed,
            sentence_mode: true,
            jitter_seed: Some(3),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn demo_builds_sentences_and_saves() {
        let store = Arc::new(MemoryStore::new());
        let report = replay(
            demo_frames(true),
            config(true),
            Preferences::default(),
            store.clone(),
            ReplayOptions::default(),
        )
        .await
        .unwrap();

        let english: Vec<&str> = report.sentences.iter().map(|s| s.english.as_str()).collect();
        assert_eq!(english, vec!["Thank you", "I am good"]);

        let signs: Vec<&str> = report.signs.iter().map(|e| e.sign.as_str()).collect();
        assert_eq!(signs, vec!["THANK YOU", "I / SMALL", "GOOD / YES"]);
        assert!(report.signs[0].two_handed);

        // Only signs followed by a quiet period are saved.
        let saved: Vec<&str> = report.saved.iter().map(|r| r.record.text.as_str()).collect();
        assert_eq!(saved, vec!["THANK YOU", "GOOD / YES"]);
        assert_eq!(store.len(), 2);
        assert!(store.records().iter().all(|r| r.record.auto_saved));
    }

    #[tokio::test(start_paused = true)]
    async fn single_hand_demo_skips_two_handed_segment() {
        let report = replay(
            demo_frames(false),
            config(false),
            Preferences::default(),
            Arc::new(MemoryStore::new()),
            ReplayOptions { speed: 4.0 },
        )
        .await
        .unwrap();
        assert_eq!(report.model, "rules");
        assert_eq!(report.sentences.len(), 1);
        assert_eq!(report.sentences[0].gestures, vec!["I / SMALL", "GOOD / YES"]);
        assert_eq!(report.saved.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_recording_closes_the_sentence() {
        let fist = vec![hand_with(Pose::fist(), 0.5, 0.5)];
        let frames: Vec<RecordedFrame> = (0..5)
            .map(|_| RecordedFrame {
                timestamp_ms: None,
                hands: fist.clone(),
            })
            .collect();
        let report = replay(
            frames,
            config(false),
            Preferences::default(),
            Arc::new(MemoryStore::new()),
            ReplayOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.frames, 5);
        assert_eq!(report.duration_ms, 4 * FRAME_INTERVAL_MS);
        assert_eq!(report.sentences.len(), 1);
        assert_eq!(report.sentences[0].english, "A");
        assert_eq!(report.sentences[0].at_ms, 4 * FRAME_INTERVAL_MS + 2_501);
    }

    #[tokio::test(start_paused = true)]
    async fn sentence_mode_off_still_recognizes() {
        let report = replay(
            demo_frames(false),
            PipelineConfig {
                jitter_seed: Some(3),
                ..Default::default()
            },
            Preferences::default(),
            Arc::new(MemoryStore::new()),
            ReplayOptions::default(),
        )
        .await
        .unwrap();
        assert!(report.sentences.is_empty());
        assert_eq!(report.signs.len(), 2);
    }

    #[test]
    fn recording_parses_from_yaml_and_json() {
        let yaml = "- timestamp_ms: 10\n  hands: []\n- hands:\n    - - {x: 0.1, y: 0.2, z: 0.0}\n";
        let frames: Vec<RecordedFrame> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(frames[0].timestamp_ms, Some(10));
        assert!(frames[1].timestamp_ms.is_none());
        assert_eq!(frames[1].hands[0][0], Landmark::new(0.1, 0.2, 0.0));

        let json = serde_json::to_string(&demo_frames(false)[0]).unwrap();
        let back: RecordedFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hands[0].len(), 21);
    }
}
