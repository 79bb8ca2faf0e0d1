//! Local transcript files.
//!
//! Treats the video identifier as a path. Plain `.txt` files are used verbatim; `.srt` and
//! `.vtt` subtitle files have their cue numbers, timing lines and markup removed.

use super::{Language, TranscriptSource};
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Transcript source backed by files on disk.
pub struct LocalTranscript;

impl LocalTranscript {
    pub fn new() -> Self {
        Self
    }

    /// Check if this source can handle the given input.
    pub fn can_handle(&self, input: &str) -> bool {
        Path::new(input).is_file()
    }
}

impl Default for LocalTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for LocalTranscript {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str, language: Language) -> Result<Option<String>> {
        let path = Path::new(video_id);
        if !path.exists() {
            return Ok(None);
        }

        debug!("Reading transcript file, language preference ignored");

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TubechatError::Fetch(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let text = match ext.as_deref() {
            Some("srt") | Some("vtt") => strip_cues(&content),
            _ => content,
        };

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

/// Reduce SRT/WebVTT subtitles to their spoken text, one space between cues.
pub fn strip_cues(content: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

    let mut lines = Vec::new();
    let mut in_header = false;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();

        if i == 0 && line.trim_start_matches('\u{feff}').starts_with("WEBVTT") {
            in_header = true;
            continue;
        }
        if line.is_empty() {
            in_header = false;
            continue;
        }
        if in_header || line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let text = tag.replace_all(line, "");
        let text = text.trim();
        if !text.is_empty() {
            lines.push(text.to_string());
        }
    }

    lines.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_srt() {
        let srt = "1\n00:00:00,000 --> 00:00:02,000\nAlice said hello.\n\n2\n00:00:02,000 --> 00:00:04,000\nBob replied hi.\n";
        assert_eq!(strip_cues(srt), "Alice said hello. Bob replied hi.");
    }

    #[test]
    fn test_strip_vtt() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n00:00.000 --> 00:02.000\n<c>Alice</c> said hello.\n\n00:02.000 --> 00:04.000 align:start\nBob replied hi.\n";
        assert_eq!(strip_cues(vtt), "Alice said hello. Bob replied hi.");
    }

    #[tokio::test]
    async fn test_fetch_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.txt");
        std::fs::write(&path, "Alice said hello. Bob replied hi.").unwrap();

        let source = LocalTranscript::new();
        let input = path.to_str().unwrap();
        assert!(source.can_handle(input));

        let text = source.fetch(input, Language::English).await.unwrap();
        assert_eq!(text.as_deref(), Some("Alice said hello. Bob replied hi."));
    }

    #[tokio::test]
    async fn test_missing_or_blank_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalTranscript::new();

        let missing = dir.path().join("missing.txt");
        assert!(source
            .fetch(missing.to_str().unwrap(), Language::English)
            .await
            .unwrap()
            .is_none());

        let blank = dir.path().join("blank.srt");
        std::fs::write(&blank, "1\n00:00:00,000 --> 00:00:01,000\n\n").unwrap();
        assert!(source
            .fetch(blank.to_str().unwrap(), Language::English)
            .await
            .unwrap()
            .is_none());
    }
}
