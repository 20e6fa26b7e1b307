use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::errors::{ApiError, Result};
use super::types::{
    DownloadedVideo, DriveFolder, DriveUploadRequest, DriveUploadResult, FolderListResponse,
    HistoryEntry, HistoryResponse, PublishRequest, PublishResult, QuickPublishRequest, VideoInfo,
};

/// Raw file bytes from `GET /download_file/{filename}`.
pub type FileStream = BoxStream<'static, Result<Bytes>>;

/// The backend surface the workflow controller drives. Production uses
/// [`HttpBackend`]; tests substitute a mock.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn video_info(&self, url: &str) -> Result<VideoInfo>;

    async fn download(&self, url: &str) -> Result<DownloadedVideo>;

    async fn drive_folders(&self) -> Result<Vec<DriveFolder>>;

    async fn upload_to_drive(&self, request: &DriveUploadRequest) -> Result<DriveUploadResult>;

    /// `POST /upload_to_youtube` - republish with operator-supplied metadata.
    async fn publish(&self, request: &PublishRequest) -> Result<PublishResult>;

    /// `POST /api/upload_to_yt` - republish reusing the original metadata.
    async fn quick_publish(&self, request: &QuickPublishRequest) -> Result<PublishResult>;

    async fn fetch_file(&self, filename: &str) -> Result<FileStream>;

    async fn history(&self) -> Result<Vec<HistoryEntry>>;

    /// The logout navigation; forces re-authentication on the next visit.
    async fn logout(&self) -> Result<()>;

    /// Where the user starts the interactive auth flow.
    fn auth_url(&self) -> String;
}

/// Decode a backend body. An `error` field wins over everything, including a
/// 2xx status; a non-success status without one maps to a status error; only
/// then is the body deserialized into its typed shape.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let value = decode_value(status, body)?;
    serde_json::from_value(value).map_err(|err| ApiError::malformed(err.to_string()))
}

fn decode_value(status: StatusCode, body: &str) -> Result<Value> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            if !status.is_success() {
                return Err(ApiError::server_error(status.as_u16()));
            }
            return Err(ApiError::malformed(err.to_string()));
        }
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        let reauth = value.get("action_required").and_then(Value::as_str) == Some("reauth");
        if reauth {
            return Err(ApiError::ReauthRequired {
                message: message.to_string(),
            });
        }
        return Err(ApiError::Application(message.to_string()));
    }

    if !status.is_success() {
        return Err(ApiError::server_error(status.as_u16()));
    }

    Ok(value)
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)?).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        decode_body(status, &text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)?).send().await?;
        let status = response.status();
        let text = response.text().await?;
        decode_body(status, &text)
    }

    /// Build the raw-file URL with the filename pushed as path segments, so
    /// `?`, `#`, and spaces end up percent-encoded instead of being parsed
    /// as query or fragment.
    fn file_url(&self, filename: &str) -> Result<Url> {
        let mut url = self.url("download_file")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::malformed("endpoint URL cannot be a base"))?
            .extend(filename.split('/'));
        Ok(url)
    }
}

#[derive(Serialize)]
struct UrlBody<'a> {
    url: &'a str,
}

#[async_trait]
impl Backend for HttpBackend {
    async fn video_info(&self, url: &str) -> Result<VideoInfo> {
        let response = self
            .client
            .post(self.url("get_video_info")?)
            .json(&UrlBody { url })
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Missing title is its own failure, distinct from a parse error.
        let value = decode_value(status, &text)?;
        match value.get("title").and_then(Value::as_str) {
            Some(title) if !title.is_empty() => {}
            _ => return Err(ApiError::MissingTitle),
        }
        serde_json::from_value(value).map_err(|err| ApiError::malformed(err.to_string()))
    }

    async fn download(&self, url: &str) -> Result<DownloadedVideo> {
        self.post_json("download", &UrlBody { url }).await
    }

    async fn drive_folders(&self) -> Result<Vec<DriveFolder>> {
        let response: FolderListResponse = self.get_json("get_drive_folders").await?;
        Ok(response.folders)
    }

    async fn upload_to_drive(&self, request: &DriveUploadRequest) -> Result<DriveUploadResult> {
        self.post_json("upload_to_drive", request).await
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResult> {
        self.post_json("upload_to_youtube", request).await
    }

    async fn quick_publish(&self, request: &QuickPublishRequest) -> Result<PublishResult> {
        self.post_json("api/upload_to_yt", request).await
    }

    async fn fetch_file(&self, filename: &str) -> Result<FileStream> {
        let response = self.client.get(self.file_url(filename)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::server_error(status.as_u16()));
        }
        let stream = response.bytes_stream().map_err(ApiError::from);
        Ok(Box::pin(stream))
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let response: HistoryResponse = self.get_json("history").await?;
        Ok(response.videos)
    }

    async fn logout(&self) -> Result<()> {
        self.client.get(self.url("logout")?).send().await?;
        Ok(())
    }

    fn auth_url(&self) -> String {
        self.base
            .join("auth")
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}auth", self.base))
    }
}
