//! CLI configuration.
//!
//! Configuration is stored in ~/.ksl/{app_name}/config.yaml

use std::path::{Path, PathBuf};

use ksl_gesture::ModelKind;
use ksl_sentence::Language;
use ksl_translator::{PipelineConfig, Preferences};
use serde::{Deserialize, Serialize};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".ksl";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Default history filename, next to the config file.
pub const DEFAULT_HISTORY_FILE: &str = "history.jsonl";

/// Keys accepted by [`Config::set`].
pub const SETTABLE_KEYS: &[&str] = &[
    "output_language",
    "auto_play_tts",
    "speech_rate",
    "volume",
    "model",
    "two_handed",
    "sentence_mode",
    "jitter_seed",
    "smoothing.window_size",
    "smoothing.min_samples",
    "sentence.pause_ms",
    "sentence.min_gestures",
    "sentence.max_gestures",
    "autosave.min_confidence",
    "autosave.stable_count",
    "autosave.debounce_ms",
    "history_path",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output language, speech and auto-play settings.
    pub preferences: Preferences,

    /// Recognition pipeline settings.
    pub pipeline: PipelineConfig,

    /// Translation history file (default: history.jsonl next to the config).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir(app_name: &str) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(app_name))
    }

    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Self::default_config_dir(app_name).map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Resolved history file location.
    pub fn history_path(&self) -> PathBuf {
        match &self.history_path {
            Some(p) => p.clone(),
            None => self
                .config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_HISTORY_FILE),
        }
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Restores default preferences and pipeline settings. The history
    /// location is kept.
    pub fn reset(&mut self) {
        self.preferences = Preferences::default();
        self.pipeline = PipelineConfig::default();
    }

    /// Sets a single value by dotted key. Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let prefs = &mut self.preferences;
        let pipeline = &mut self.pipeline;
        match key {
            "output_language" => {
                prefs.output_language = Language::parse(value)
                    .ok_or_else(|| anyhow::anyhow!("unknown language '{}'", value))?;
            }
            "auto_play_tts" => prefs.auto_play_tts = parse_value(key, value)?,
            "speech_rate" => prefs.speech_rate = parse_value(key, value)?,
            "volume" => prefs.volume = parse_value(key, value)?,
            "model" => {
                pipeline.model = match value {
                    "rules" => ModelKind::Rules,
                    "tensor" => ModelKind::Tensor,
                    _ => anyhow::bail!("unknown model '{}', expected rules or tensor", value),
                };
            }
            "two_handed" => pipeline.two_handed = parse_value(key, value)?,
            "sentence_mode" => pipeline.sentence_mode = parse_value(key, value)?,
            "jitter_seed" => {
                pipeline.jitter_seed = match value {
                    "" | "none" => None,
                    _ => Some(parse_value(key, value)?),
                };
            }
            "smoothing.window_size" => pipeline.smoothing.window_size = parse_value(key, value)?,
            "smoothing.min_samples" => pipeline.smoothing.min_samples = parse_value(key, value)?,
            "sentence.pause_ms" => pipeline.sentence.pause_ms = parse_value(key, value)?,
            "sentence.min_gestures" => pipeline.sentence.min_gestures = parse_value(key, value)?,
            "sentence.max_gestures" => pipeline.sentence.max_gestures = parse_value(key, value)?,
            "autosave.min_confidence" => {
                pipeline.autosave.min_confidence = parse_value(key, value)?
            }
            "autosave.stable_count" => pipeline.autosave.stable_count = parse_value(key, value)?,
            "autosave.debounce_ms" => pipeline.autosave.debounce_ms = parse_value(key, value)?,
            "history_path" => {
                self.history_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => anyhow::bail!(
                "unknown key '{}', expected one of: {}",
                key,
                SETTABLE_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value '{}' for {}: {}", value, key, e))
}

/// Loads configuration for the specified app.
///
/// A missing file is created with defaults.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&content)?
    } else {
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    cfg.config_path = config_path;
    Ok(cfg)
}
