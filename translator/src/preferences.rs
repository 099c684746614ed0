use ksl_sentence::Language;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// User settings that affect output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub output_language: Language,
    pub auto_play_tts: bool,
    pub speech_rate: f32,
    pub volume: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            output_language: Language::English,
            auto_play_tts: false,
            speech_rate: 1.0,
            volume: 1.0,
        }
    }
}

/// Supplies the current preferences. Read at call time, never cached.
pub trait PreferenceProvider: Send + Sync {
    fn preferences(&self) -> Preferences;
}

/// Preferences held in memory and changeable at runtime.
#[derive(Debug, Default)]
pub struct SharedPreferences {
    inner: RwLock<Preferences>,
}

impl SharedPreferences {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            inner: RwLock::new(preferences),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut Preferences)) {
        f(&mut self.inner.write());
    }
}

impl PreferenceProvider for SharedPreferences {
    fn preferences(&self) -> Preferences {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = Preferences::default();
        assert_eq!(p.output_language, Language::English);
        assert!(!p.auto_play_tts);
        assert_eq!(p.speech_rate, 1.0);
        assert_eq!(p.volume, 1.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: Preferences = serde_json::from_str(r#"{"output_language":"swahili"}"#).unwrap();
        assert_eq!(p.output_language, Language::Swahili);
        assert_eq!(p.volume, 1.0);
    }

    #[test]
    fn shared_preferences_update() {
        let shared = SharedPreferences::default();
        shared.update(|p| p.auto_play_tts = true);
        assert!(shared.preferences().auto_play_tts);
    }
}
