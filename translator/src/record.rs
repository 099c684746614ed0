use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A translation handed to the history sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub text: String,
    /// Rounded confidence in percent.
    pub confidence: u32,
    pub timestamp: DateTime<Utc>,
    pub is_favorite: bool,
    pub synced: bool,
    #[serde(default)]
    pub auto_saved: bool,
}

impl TranslationRecord {
    /// A record saved on explicit user request.
    pub fn manual(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: round_confidence(confidence),
            timestamp: Utc::now(),
            is_favorite: false,
            synced: false,
            auto_saved: false,
        }
    }

    /// A record written by the auto-save debouncer.
    pub fn auto_saved(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            auto_saved: true,
            ..Self::manual(text, confidence)
        }
    }
}

fn round_confidence(confidence: f32) -> u32 {
    confidence.round().clamp(0.0, 100.0) as u32
}
