use std::fmt;

use serde::{Deserialize, Serialize};

/// Output language for rendered sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Swahili,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Swahili => "swahili",
        }
    }

    /// BCP 47 tag handed to speech engines.
    pub fn tts_tag(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Swahili => "sw-KE",
        }
    }

    /// Parses `"english"`/`"en"` or `"swahili"`/`"sw"`, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "swahili" | "sw" => Some(Language::Swahili),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
