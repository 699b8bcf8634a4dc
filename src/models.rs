//! Request and response shapes exchanged with the host process

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Where the downloader should take cookies from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSource {
    None,
    Firefox,
    File,
}

impl CookieSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookieSource::None => "none",
            CookieSource::Firefox => "firefox",
            CookieSource::File => "file",
        }
    }
}

/// One download intent, named the way callers name things (camelCase).
///
/// The bridge serializes this and normalizes its keys before sending, so the
/// host sees `output_directory`, `cookie_file_path` and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub url: String,

    /// Container or audio format, e.g. "mp4", "mkv", "mp3"
    pub format: String,

    /// Height limit or audio quality, "auto" for best
    pub quality: String,

    pub output_directory: String,

    /// "none" | "firefox" | "file"
    pub cookie_source: String,

    /// Only meaningful when `cookie_source` is "file"
    pub cookie_file_path: Option<String>,

    /// Text-encoded positive integer
    pub concurrent_connections: String,

    pub playlist_mode: bool,
    pub thumbnail_embed: bool,
    pub thumbnail_crop: bool,
    pub chapter_embed: bool,
    pub compatibility_mode: bool,
    pub hdr_mode: bool,
}

impl DownloadRequest {
    /// Create a request with the host's default options
    pub fn new(url: impl Into<String>, output_directory: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: "mp4".to_string(),
            quality: "auto".to_string(),
            output_directory: output_directory.into(),
            cookie_source: CookieSource::None.as_str().to_string(),
            cookie_file_path: None,
            concurrent_connections: "3".to_string(),
            playlist_mode: false,
            thumbnail_embed: false,
            thumbnail_crop: false,
            chapter_embed: false,
            compatibility_mode: false,
            hdr_mode: false,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Set the cookie source; a cookie file path is kept only for `File`
    pub fn with_cookie_source(mut self, source: CookieSource, file_path: Option<String>) -> Self {
        self.cookie_source = source.as_str().to_string();
        self.cookie_file_path = match source {
            CookieSource::File => file_path,
            _ => None,
        };
        self
    }

    pub fn with_concurrent_connections(mut self, count: u32) -> Self {
        self.concurrent_connections = count.to_string();
        self
    }

    pub fn with_playlist_mode(mut self, enabled: bool) -> Self {
        self.playlist_mode = enabled;
        self
    }

    pub fn with_thumbnail(mut self, embed: bool, crop: bool) -> Self {
        self.thumbnail_embed = embed;
        self.thumbnail_crop = crop;
        self
    }

    pub fn with_chapter_embed(mut self, enabled: bool) -> Self {
        self.chapter_embed = enabled;
        self
    }

    pub fn with_compatibility_mode(mut self, enabled: bool) -> Self {
        self.compatibility_mode = enabled;
        self
    }

    pub fn with_hdr_mode(mut self, enabled: bool) -> Self {
        self.hdr_mode = enabled;
        self
    }

    /// Parse the text-encoded connection count the way the host does.
    ///
    /// Returns `None` for empty, zero, negative or non-numeric values.
    pub fn connection_count(&self) -> Option<NonZeroU32> {
        self.concurrent_connections.trim().parse().ok()
    }

    /// Cookie file path, if the cookie source actually refers to a file
    pub fn cookie_file(&self) -> Option<&str> {
        if self.cookie_source == CookieSource::File.as_str() {
            self.cookie_file_path.as_deref()
        } else {
            None
        }
    }
}

/// Terminal result of a download attempt
///
/// A returned outcome with `is_error` set is still a successful call; the
/// caller must treat it as a failed download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub message: String,

    /// Fraction in 0.0..=1.0, absent when indeterminate
    #[serde(default)]
    pub progress: Option<f64>,

    pub is_error: bool,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        !self.is_error
    }
}

/// Opaque settings blob, owned and persisted by the host
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub JsonValue);

impl Settings {
    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

impl From<JsonValue> for Settings {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

/// File chooser filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// Filter used when picking a cookie file
    pub fn cookie_files() -> Self {
        Self {
            name: "Cookie Files".to_string(),
            extensions: vec!["txt".to_string()],
        }
    }
}

/// One line of downloader output, pushed by the host while a download runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadLog {
    pub message: String,
    pub is_error: bool,

    /// Percentage in 0..=100 when the line carried progress
    #[serde(default)]
    pub progress: Option<f64>,
}

impl DownloadLog {
    /// Progress as a 0.0..=1.0 fraction
    pub fn fraction(&self) -> Option<f64> {
        self.progress.map(|p| (p / 100.0).clamp(0.0, 1.0))
    }
}

/// Notification received from the host outside of any call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEvent {
    pub name: String,
    pub payload: JsonValue,
    pub received_at: DateTime<Utc>,
}

impl HostEvent {
    pub const DOWNLOAD_LOG: &'static str = "download-log";

    pub fn new(name: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            name: name.into(),
            payload,
            received_at: Utc::now(),
        }
    }

    /// Decode a `download-log` notification
    pub fn download_log(&self) -> Option<DownloadLog> {
        if self.name != Self::DOWNLOAD_LOG {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = DownloadRequest::new("https://example.com/v", "/tmp/out");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["outputDirectory"], json!("/tmp/out"));
        assert_eq!(value["cookieFilePath"], JsonValue::Null);
        assert_eq!(value["concurrentConnections"], json!("3"));
        assert_eq!(value["hdrMode"], json!(false));
    }

    #[test]
    fn test_connection_count() {
        let request = DownloadRequest::new("u", "d");
        assert_eq!(request.connection_count().map(|n| n.get()), Some(3));

        let mut request = request.with_concurrent_connections(8);
        assert_eq!(request.connection_count().map(|n| n.get()), Some(8));

        for bad in ["0", "", "-2", "four"] {
            request.concurrent_connections = bad.to_string();
            assert_eq!(request.connection_count(), None, "{bad:?}");
        }
    }

    #[test]
    fn test_cookie_file_only_for_file_source() {
        let request = DownloadRequest::new("u", "d")
            .with_cookie_source(CookieSource::File, Some("/tmp/cookies.txt".to_string()));
        assert_eq!(request.cookie_file(), Some("/tmp/cookies.txt"));

        let request = request.with_cookie_source(CookieSource::Firefox, Some("ignored".to_string()));
        assert_eq!(request.cookie_source, "firefox");
        assert_eq!(request.cookie_file_path, None);
        assert_eq!(request.cookie_file(), None);
    }

    #[test]
    fn test_outcome_without_progress() {
        let outcome: DownloadOutcome =
            serde_json::from_value(json!({ "message": "failed", "is_error": true })).unwrap();
        assert_eq!(outcome.progress, None);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_settings_is_transparent() {
        let settings = Settings::from(json!({ "format": "mkv" }));
        assert_eq!(serde_json::to_value(&settings).unwrap(), json!({ "format": "mkv" }));
    }

    #[test]
    fn test_download_log_event() {
        let event = HostEvent::new(
            HostEvent::DOWNLOAD_LOG,
            json!({ "message": "[DOWNLOADING]: 42.0%", "is_error": false, "progress": 42.0 }),
        );
        let log = event.download_log().unwrap();
        assert_eq!(log.fraction(), Some(0.42));

        let other = HostEvent::new("something-else", json!({}));
        assert!(other.download_log().is_none());
    }
}
