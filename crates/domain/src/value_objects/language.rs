//! Practice language value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Language the user is practicing
///
/// Recognition services are keyed by a region-qualified tag (`ja-JP`), while
/// synthesis services take the short code (`ja`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// Japanese
    #[default]
    #[serde(rename = "ja")]
    Japanese,
    /// English
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// All supported languages
    pub const ALL: [Self; 2] = [Self::Japanese, Self::English];

    /// Short ISO 639-1 code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Japanese => "ja",
            Self::English => "en",
        }
    }

    /// Region-qualified tag used for speech recognition
    #[must_use]
    pub const fn asr_tag(&self) -> &'static str {
        match self {
            Self::Japanese => "ja-JP",
            Self::English => "en-US",
        }
    }

    /// Language code used for speech synthesis
    #[must_use]
    pub const fn tts_code(&self) -> &'static str {
        self.code()
    }

    /// Human-readable name
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Japanese => "Japanese",
            Self::English => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ja" | "ja-jp" | "japanese" | "日本語" => Ok(Self::Japanese),
            "en" | "en-us" | "english" | "英語" => Ok(Self::English),
            other => Err(DomainError::UnknownLanguage(other.to_string())),
        }
    }
}
