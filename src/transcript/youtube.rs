//! YouTube captions via yt-dlp.
//!
//! yt-dlp lists the manual and auto-generated caption tracks for a video; the chosen track
//! is then downloaded in YouTube's `json3` timed-text format and flattened to plain text.

use super::{Language, TranscriptSource};
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// A caption track chosen for download.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    /// Language code as listed by yt-dlp (e.g. `en`, `en-GB`).
    pub language: String,
    /// Download URL, already requesting the json3 format.
    pub url: String,
    /// Whether this is an automatic (ASR) track.
    pub auto_generated: bool,
}

/// YouTube caption source.
pub struct YoutubeCaptions {
    ytdlp_path: String,
    http: reqwest::Client,
}

impl YoutubeCaptions {
    /// Create a source using a specific yt-dlp binary and HTTP timeout.
    pub fn with_config(ytdlp_path: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TubechatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            ytdlp_path: ytdlp_path.to_string(),
            http,
        })
    }

    /// Fetch video info (including caption listings) using yt-dlp.
    async fn video_info(&self, video_id: &str) -> Result<Value> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new(&self.ytdlp_path)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                &url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubechatError::ToolNotFound(self.ytdlp_path.clone())
                } else {
                    TubechatError::Fetch(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubechatError::Fetch(format!(
                "yt-dlp could not read video {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| TubechatError::Fetch(format!("Failed to parse yt-dlp output: {}", e)))
    }

    async fn download_track(&self, track: &CaptionTrack) -> Result<String> {
        debug!("Downloading {} captions", track.language);

        let response = self
            .http
            .get(&track.url)
            .send()
            .await
            .map_err(|e| TubechatError::Fetch(format!("Caption request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TubechatError::Fetch(format!(
                "Caption download returned HTTP {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TubechatError::Fetch(format!("Failed to read caption body: {}", e)))
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptions {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str, language: Language) -> Result<Option<String>> {
        let info = self.video_info(video_id).await?;

        let Some(track) = select_track(&info, language.codes()) else {
            info!("No captions for {} in {:?}", video_id, language.codes());
            return Ok(None);
        };

        info!(
            "Using {} captions{}",
            track.language,
            if track.auto_generated { " (auto-generated)" } else { "" }
        );

        let body = self.download_track(&track).await?;
        let text = parse_json3(&body)?;

        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

/// Pick a caption track from yt-dlp video info.
///
/// Codes are tried in order. For each code a manual track beats an automatic one, and an
/// exact language match beats a regional variant (`en` before `en-GB`). YouTube lists its
/// machine translations under `automatic_captions` too (URLs carrying `tlang`); those are
/// never selected, and the speech-recognition track for a code may be keyed `<code>-orig`.
pub fn select_track(info: &Value, codes: &[&str]) -> Option<CaptionTrack> {
    for code in codes {
        for (key, auto_generated) in [("subtitles", false), ("automatic_captions", true)] {
            let Some(tracks) = info[key].as_object() else {
                continue;
            };

            let original = format!("{}-orig", code);
            let regional = format!("{}-", code);
            let candidates = tracks
                .get_key_value(*code)
                .into_iter()
                .chain(tracks.get_key_value(&original))
                .chain(
                    tracks
                        .iter()
                        .filter(|(lang, _)| lang.starts_with(&regional) && **lang != original),
                );

            for (lang, formats) in candidates {
                if let Some(url) = json3_url(formats) {
                    return Some(CaptionTrack {
                        language: lang.trim_end_matches("-orig").to_string(),
                        url,
                        auto_generated,
                    });
                }
            }
        }
    }
    None
}

/// Whether a caption URL asks YouTube to machine-translate the track.
fn is_translation(url: &Url) -> bool {
    url.query_pairs().any(|(k, _)| k == "tlang")
}

/// Find the json3 download URL among a track's formats, skipping translations.
fn json3_url(formats: &Value) -> Option<String> {
    let formats: Vec<(Option<&str>, Url)> = formats
        .as_array()?
        .iter()
        .filter_map(|f| Some((f["ext"].as_str(), Url::parse(f["url"].as_str()?).ok()?)))
        .filter(|(_, url)| !is_translation(url))
        .collect();

    if let Some((_, url)) = formats.iter().find(|(ext, _)| *ext == Some("json3")) {
        return Some(url.to_string());
    }

    // Any timedtext URL can be asked for json3 directly
    let (_, mut url) = formats.into_iter().next()?;
    let query: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(query)
        .append_pair("fmt", "json3");
    Some(url.to_string())
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Flatten a json3 caption document into one line of text.
///
/// Fragments are ordered by start time and joined with single spaces. Whitespace inside a
/// fragment (line breaks in particular) collapses to one space; empty fragments are dropped.
pub fn parse_json3(body: &str) -> Result<String> {
    let mut doc: Json3 = serde_json::from_str(body)
        .map_err(|e| TubechatError::Fetch(format!("Malformed caption data: {}", e)))?;

    doc.events.sort_by_key(|e| e.start_ms);

    let fragments: Vec<String> = doc
        .events
        .iter()
        .map(|event| {
            let raw: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|fragment| !fragment.is_empty())
        .collect();

    Ok(fragments.join(" "))
}
