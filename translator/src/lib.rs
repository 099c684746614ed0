//! KSL translator core: from landmark frames to saved and spoken
//! translations.
//!
//! # Components
//!
//! - [`Pipeline`]: classifies and smooths each frame, then fans the stable
//!   sign out to the sentence session, the auto-saver and auto-play
//! - [`SentenceSession`] and [`BoundaryPoller`]: sentence mode with
//!   pause-based boundary detection
//! - [`AutoSaver`]: debounced history writes through a [`TranslationStore`]
//! - [`AutoPlay`]: preference-driven speech through a [`Speaker`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ksl_translator::{
//!     LogSpeaker, MemoryStore, Pipeline, PipelineConfig, PipelineDeps, SharedPreferences,
//! };
//!
//! # async fn run(frames: Vec<Vec<Vec<ksl_gesture::Landmark>>>) {
//! let deps = PipelineDeps::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(LogSpeaker),
//!     Arc::new(SharedPreferences::default()),
//! );
//! let mut pipeline = Pipeline::new(PipelineConfig::default(), deps);
//! for hands in &frames {
//!     let out = pipeline.process_frame(hands);
//!     if let Some(sign) = out.classification {
//!         println!("{} ({:.0}%)", sign.sign, sign.confidence);
//!     }
//! }
//! # }
//! ```

mod autosave;
mod error;
mod pipeline;
mod preferences;
mod record;
mod session;
mod speech;
mod store;

pub use autosave::{AutoSaveConfig, AutoSaver};
pub use error::TranslatorError;
pub use pipeline::{FrameOutput, Pipeline, PipelineConfig, PipelineDeps, PipelineState};
pub use preferences::{PreferenceProvider, Preferences, SharedPreferences};
pub use record::TranslationRecord;
pub use session::{BoundaryPoller, SentenceSession, SessionState, SignAdded};
pub use speech::{AutoPlay, LogSpeaker, Speaker, SpeechRequest};
pub use store::{JsonlStore, MemoryStore, StoredRecord, TranslationStore};

#[cfg(test)]
mod tests;
