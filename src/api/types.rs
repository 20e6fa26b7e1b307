use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::format_duration;

/// Shown when the backend sends no usable thumbnail.
pub const THUMBNAIL_PLACEHOLDER: &str = "https://via.placeholder.com/120x90?text=No+Thumbnail";

/// Identifier of the source video on the backend. The backend hands out a
/// numeric database id, but the value is opaque to this client and must be
/// echoed back exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoId {
    Text(String),
    Numeric(i64),
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoId::Text(s) => write!(f, "{s}"),
            VideoId::Numeric(n) => write!(f, "{n}"),
        }
    }
}

/// Response of `POST /get_video_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl VideoInfo {
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }

    pub fn uploader_display(&self) -> &str {
        match self.uploader.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => "Unknown uploader",
        }
    }

    /// Thumbnail URL with the placeholder substituted for an absent or
    /// empty value.
    pub fn thumbnail_or_placeholder(&self) -> &str {
        match self.thumbnail.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => THUMBNAIL_PLACEHOLDER,
        }
    }
}

/// Response of `POST /download`. Stored wholesale as the session; fields the
/// client does not interpret are retained in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedVideo {
    pub filename: String,
    pub title: String,
    pub video_id: VideoId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveFolder {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderListResponse {
    #[serde(default)]
    pub folders: Vec<DriveFolder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriveUploadRequest {
    pub filename: String,
    pub folder_id: String,
    pub video_id: VideoId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveUploadResult {
    #[serde(default)]
    pub file_id: Option<String>,
}

impl DriveUploadResult {
    /// Drive view link for the uploaded file, when the backend returned one.
    pub fn view_link(&self) -> Option<String> {
        self.file_id
            .as_deref()
            .map(|id| format!("https://drive.google.com/file/d/{id}/view"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Unlisted,
    #[default]
    Private,
}

/// Operator-supplied metadata for the custom republish variant. Defaults
/// mirror the original form: empty fields fall back rather than error.
#[derive(Debug, Clone)]
pub struct PublishForm {
    pub title: String,
    pub description: String,
    pub tags: String,
    pub privacy_status: PrivacyStatus,
}

impl Default for PublishForm {
    fn default() -> Self {
        Self {
            title: "Uploaded video".to_string(),
            description: String::new(),
            tags: String::new(),
            privacy_status: PrivacyStatus::Private,
        }
    }
}

/// Body of `POST /upload_to_youtube` (custom metadata).
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    pub filename: String,
    pub video_id: VideoId,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub privacy_status: PrivacyStatus,
}

/// Body of `POST /api/upload_to_yt` (original metadata, server-side lookup).
#[derive(Debug, Clone, Serialize)]
pub struct QuickPublishRequest {
    pub filename: String,
    pub video_id: VideoId,
    pub privacy_status: PrivacyStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishResult {
    pub youtube_video_id: String,
}

impl PublishResult {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.youtube_video_id)
    }
}

/// One record of `GET /history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub id: VideoId,
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub uploaded_to_drive: bool,
    #[serde(default)]
    pub uploaded_to_youtube: bool,
    #[serde(default)]
    pub download_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub videos: Vec<HistoryEntry>,
}
