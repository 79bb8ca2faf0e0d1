//! Transcript sources.
//!
//! A source turns a video identifier and a language preference into one plain-text
//! transcript. Captions that do not exist (disabled, or none in any requested language)
//! are reported as `Ok(None)`; anything unexpected is an error.

mod local;
mod youtube;

pub use local::LocalTranscript;
pub use youtube::{parse_json3, select_track, CaptionTrack, YoutubeCaptions};

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Caption language preference.
///
/// Each variant maps to an ordered list of caption language codes; the first code with a
/// usable track wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hindi,
    HindiAuto,
    EnglishAuto,
}

impl Language {
    /// All supported preferences, in display order.
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Hindi,
        Language::HindiAuto,
        Language::EnglishAuto,
    ];

    /// Caption language codes, tried in order.
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            Language::English => &["en"],
            Language::Hindi => &["hi"],
            Language::HindiAuto => &["hi", "en"],
            Language::EnglishAuto => &["en", "hi"],
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::HindiAuto => "Hindi (Auto-generated)",
            Language::EnglishAuto => "English (Auto-generated)",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "en" | "english" => Ok(Language::English),
            "hi" | "hindi" => Ok(Language::Hindi),
            "hi_auto" | "hindi_auto" | "hindi_(auto_generated)" => Ok(Language::HindiAuto),
            "en_auto" | "english_auto" | "english_(auto_generated)" => Ok(Language::EnglishAuto),
            _ => Err(format!(
                "Unknown language: {} (expected one of: en, hi, hi-auto, en-auto)",
                s
            )),
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for `video_id`, or `None` if no captions are available.
    async fn fetch(&self, video_id: &str, language: Language) -> Result<Option<String>>;
}

/// Extract a YouTube video ID from a URL or bare ID.
pub fn parse_video_id(input: &str) -> Option<String> {
    static VIDEO_ID: OnceLock<Regex> = OnceLock::new();
    let regex = VIDEO_ID.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    });

    let caps = regex.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.codes(), &["en"]);
        assert_eq!(Language::Hindi.codes(), &["hi"]);
        assert_eq!(Language::HindiAuto.codes(), &["hi", "en"]);
        assert_eq!(Language::EnglishAuto.codes(), &["en", "hi"]);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("Hindi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("hi-auto".parse::<Language>().unwrap(), Language::HindiAuto);
        assert_eq!(
            "English (Auto-generated)".parse::<Language>().unwrap(),
            Language::EnglishAuto
        );
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_parse_video_id() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=LPZh9BOjkQs"),
            Some("LPZh9BOjkQs".to_string())
        );
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?feature=share&v=LPZh9BOjkQs"),
            Some("LPZh9BOjkQs".to_string())
        );
        assert_eq!(
            parse_video_id("https://youtu.be/LPZh9BOjkQs"),
            Some("LPZh9BOjkQs".to_string())
        );
        assert_eq!(
            parse_video_id("https://youtube.com/shorts/LPZh9BOjkQs"),
            Some("LPZh9BOjkQs".to_string())
        );
        assert_eq!(parse_video_id("  LPZh9BOjkQs "), Some("LPZh9BOjkQs".to_string()));

        assert_eq!(parse_video_id("not-a-video-id"), None);
        assert_eq!(parse_video_id(""), None);
    }
}
