//! Sentence building for recognized signs.
//!
//! Stable sign labels go into a [`SentenceBuilder`], which detects sentence
//! boundaries from the pause between tokens and renders the collected
//! tokens in English and Swahili. Rendering tries the curated phrase table
//! first ([`find_phrase`]) and falls back to word-by-word substitution
//! ([`compose_words`]).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ksl_sentence::{BuilderConfig, Language, ManualClock, SentenceBuilder};
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let mut builder = SentenceBuilder::with_clock(BuilderConfig::default(), clock.clone());
//!
//! builder.add("I", 80.0);
//! builder.add("HAPPY", 90.0);
//! clock.advance(3_000);
//! assert!(builder.boundary_reached());
//!
//! let sentence = builder.build().unwrap();
//! assert_eq!(sentence.text(Language::English), "I am happy");
//! assert_eq!(sentence.avg_confidence, 85);
//! ```

mod builder;
mod clock;
mod language;
pub mod lexicon;
pub mod phrases;

pub use builder::{
    AddOutcome, BuilderConfig, BuiltSentence, SentenceBuilder, SentenceGesture, SentenceState,
    MAX_SENTENCE_GESTURES,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use language::Language;
pub use lexicon::{compose_words, normalize_sign};
pub use phrases::{find_phrase, Phrase};
