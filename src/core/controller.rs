use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;

use crate::api::{
    ApiError, Backend, DownloadedVideo, DriveFolder, DriveUploadRequest, DriveUploadResult,
    HistoryEntry, PrivacyStatus, PublishForm, PublishRequest, PublishResult, QuickPublishRequest,
    VideoInfo,
};
use crate::progress::{ProgressCallback, ProgressInfo, ProgressProfile, SimulatedProgress};
use crate::utils::{is_valid_youtube_url, sanitize_filename};

use super::errors::{FlowError, Result};
use super::events::{FlowEvent, Operation};
use super::session::VideoSession;

/// How long a finished republish bar stays on screen.
const HIDE_PROGRESS_AFTER: Duration = Duration::from_secs(2);

/// Typed stand-in for the fixed set of named page elements: which controls
/// are revealed, what metadata is rendered, which result links exist.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Rendered metadata; its presence is the download precondition.
    pub video_info: Option<VideoInfo>,
    pub download_enabled: bool,
    pub folder_picker_visible: bool,
    pub republish_visible: bool,
    /// Selectable destination folders, behind the placeholder entry.
    pub folders: Vec<DriveFolder>,
    pub drive_link: Option<String>,
    pub host_link: Option<String>,
}

/// Sequences the five user-triggered phases against the backend: metadata →
/// download → folder listing → Drive upload → republish, plus the local
/// save. One instance per page-load equivalent; all state lives here.
pub struct WorkflowController<B> {
    backend: B,
    session: VideoSession,
    view: ViewState,
    events: broadcast::Sender<FlowEvent>,
    /// Pending fixed-delay hide from the last successful republish.
    hide_timer: Option<tokio::task::JoinHandle<()>>,
}

impl<B: Backend> WorkflowController<B> {
    pub fn new(backend: B) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            backend,
            session: VideoSession::new(),
            view: ViewState::default(),
            events,
            hide_timer: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn session(&self) -> &VideoSession {
        &self.session
    }

    pub fn auth_url(&self) -> String {
        self.backend.auth_url()
    }

    /// Fetch and render metadata for a video URL. Local validation failures
    /// never issue a request; any failure leaves the trigger retryable and
    /// previously rendered state untouched.
    pub async fn fetch_metadata(&mut self, url: &str) -> Result<VideoInfo> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FlowError::validation("Please enter a YouTube URL"));
        }
        if !is_valid_youtube_url(url) {
            return Err(FlowError::validation("Invalid YouTube URL"));
        }

        let info = self.backend.video_info(url).await?;
        self.view.download_enabled = true;
        let _ = self.events.send(FlowEvent::MetadataLoaded {
            title: info.title.clone(),
        });
        self.view.video_info = Some(info.clone());
        Ok(info)
    }

    /// Trigger the server-side download and store the response wholesale as
    /// the session. On success the folder picker and republish controls are
    /// revealed and the folder listing is refreshed; that secondary fetch is
    /// non-fatal and only logged.
    pub async fn start_download(&mut self, url: &str) -> Result<DownloadedVideo> {
        if self.view.video_info.is_none() {
            return Err(FlowError::validation(
                "Please fetch video information first",
            ));
        }

        let video = self.backend.download(url.trim()).await?;
        self.session.replace(video.clone());
        self.view.folder_picker_visible = true;
        self.view.republish_visible = true;
        let _ = self.events.send(FlowEvent::DownloadComplete {
            filename: video.filename.clone(),
        });

        if let Err(err) = self.refresh_folders().await {
            tracing::warn!("could not load Drive folders: {err}");
        }

        Ok(video)
    }

    /// The startup folder listing, fired when the backend session is already
    /// authenticated. Unlike the post-download refresh, failures here are
    /// surfaced to the user.
    pub async fn list_folders_at_startup(&mut self) -> Result<usize> {
        self.refresh_folders().await?;
        Ok(self.view.folders.len())
    }

    async fn refresh_folders(&mut self) -> Result<()> {
        let folders = self.backend.drive_folders().await?;
        // An empty listing leaves whatever was rendered before in place.
        if !folders.is_empty() {
            let count = folders.len();
            self.view.folders = folders;
            let _ = self.events.send(FlowEvent::FoldersLoaded { count });
        }
        Ok(())
    }

    /// Upload the downloaded file into the selected Drive folder. A
    /// simulated progress bar runs for the duration of the request and is
    /// cancelled on every exit path; the response resolving is what drives
    /// the terminal state.
    pub async fn upload_to_drive(&mut self, folder_id: &str) -> Result<DriveUploadResult> {
        if folder_id.trim().is_empty() {
            return Err(FlowError::validation("Please select a Google Drive folder"));
        }
        let video = self.session.require_downloaded()?;
        let request = DriveUploadRequest {
            filename: video.filename.clone(),
            folder_id: folder_id.trim().to_string(),
            video_id: video.video_id.clone(),
        };

        let bar = SimulatedProgress::start(
            ProgressProfile::drive_process(),
            self.progress_callback(Operation::DriveUpload),
        );
        let result = self.backend.upload_to_drive(&request).await?;
        bar.stop();

        self.emit_progress(
            Operation::DriveUpload,
            ProgressInfo {
                percentage: 100.0,
                stage: "Upload Complete!",
            },
        );
        self.view.drive_link = result.view_link();
        let _ = self.events.send(FlowEvent::DriveUploadComplete {
            link: result.view_link(),
        });
        Ok(result)
    }

    /// Republish reusing the original metadata; visibility is forced to
    /// private.
    pub async fn republish_original(&mut self) -> Result<PublishResult> {
        self.cancel_hide_timer();
        let video = self.session.require_downloaded()?;
        let request = QuickPublishRequest {
            filename: video.filename.clone(),
            video_id: video.video_id.clone(),
            privacy_status: PrivacyStatus::Private,
        };

        let bar = SimulatedProgress::start(
            ProgressProfile::host_upload(),
            self.progress_callback(Operation::Republish),
        );
        let result = self.backend.quick_publish(&request).await?;
        bar.stop();

        self.finish_publish(&result, "Upload to YouTube complete with original metadata!");
        Ok(result)
    }

    /// Republish with operator-supplied metadata from the form.
    pub async fn republish_custom(&mut self, form: PublishForm) -> Result<PublishResult> {
        self.cancel_hide_timer();
        let video = self.session.require_downloaded()?;
        let title = if form.title.trim().is_empty() {
            "Uploaded video".to_string()
        } else {
            form.title
        };
        let request = PublishRequest {
            filename: video.filename.clone(),
            video_id: video.video_id.clone(),
            title,
            description: form.description,
            tags: form.tags,
            privacy_status: form.privacy_status,
        };

        let bar = SimulatedProgress::start(
            ProgressProfile::host_upload(),
            self.progress_callback(Operation::Republish),
        );
        let result = self.backend.publish(&request).await?;
        bar.stop();

        self.finish_publish(&result, "Upload to YouTube complete!");
        Ok(result)
    }

    fn finish_publish(&mut self, result: &PublishResult, stage: &'static str) {
        self.emit_progress(
            Operation::Republish,
            ProgressInfo {
                percentage: 100.0,
                stage,
            },
        );
        let link = result.watch_url();
        self.view.host_link = Some(link.clone());
        let _ = self.events.send(FlowEvent::PublishComplete { link });

        // The bar lingers briefly, then hides. A rerun supersedes the
        // pending hide so it cannot clear the new run's bar.
        self.cancel_hide_timer();
        let events = self.events.clone();
        self.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(HIDE_PROGRESS_AFTER).await;
            let _ = events.send(FlowEvent::ProgressHidden {
                op: Operation::Republish,
            });
        }));
    }

    fn cancel_hide_timer(&mut self) {
        if let Some(handle) = self.hide_timer.take() {
            handle.abort();
        }
    }

    /// Stream the downloaded file to disk under the session title.
    pub async fn save_locally(&mut self, dir: &Path) -> Result<PathBuf> {
        let video = self.session.require_downloaded()?;
        let filename = format!("{}.mp4", sanitize_filename(&video.title));
        let path = dir.join(filename);

        let mut stream = self.backend.fetch_file(&video.filename).await?;
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(ApiError::from)?;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await.map_err(ApiError::from)?;
        }
        file.flush().await.map_err(ApiError::from)?;

        let _ = self.events.send(FlowEvent::Saved { path: path.clone() });
        Ok(path)
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.backend.history().await?)
    }

    /// The logout navigation, issued after the user accepts the
    /// reauthentication prompt.
    pub async fn logout(&self) -> Result<()> {
        Ok(self.backend.logout().await?)
    }

    fn emit_progress(&self, op: Operation, info: ProgressInfo) {
        let _ = self.events.send(FlowEvent::Progress { op, info });
    }

    fn progress_callback(&self, op: Operation) -> ProgressCallback {
        let events = self.events.clone();
        Arc::new(move |info| {
            let _ = events.send(FlowEvent::Progress { op, info });
        })
    }
}
