use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use ferry::api::{
    ApiError, Backend, DownloadedVideo, DriveFolder, DriveUploadRequest, DriveUploadResult,
    FileStream, HistoryEntry, PrivacyStatus, PublishForm, PublishRequest, PublishResult,
    QuickPublishRequest, Result as ApiResult, VideoId, VideoInfo,
};
use ferry::core::Operation;
use ferry::{FlowError, FlowEvent, WorkflowController};

/// Scripted backend - each endpoint pops the next queued response, and the
/// test inspects call counts and captured request bodies afterwards.
#[derive(Default)]
struct MockState {
    info: Mutex<VecDeque<ApiResult<VideoInfo>>>,
    downloads: Mutex<VecDeque<ApiResult<DownloadedVideo>>>,
    folders: Mutex<VecDeque<ApiResult<Vec<DriveFolder>>>>,
    drive: Mutex<VecDeque<ApiResult<DriveUploadResult>>>,
    publishes: Mutex<VecDeque<ApiResult<PublishResult>>>,
    quick: Mutex<VecDeque<ApiResult<PublishResult>>>,
    files: Mutex<VecDeque<ApiResult<Vec<Bytes>>>>,
    history: Mutex<VecDeque<ApiResult<Vec<HistoryEntry>>>>,

    info_calls: AtomicUsize,
    download_calls: AtomicUsize,
    folder_calls: AtomicUsize,
    drive_calls: AtomicUsize,
    publish_calls: AtomicUsize,
    quick_calls: AtomicUsize,
    logout_calls: AtomicUsize,

    last_drive_request: Mutex<Option<DriveUploadRequest>>,
    last_publish_request: Mutex<Option<PublishRequest>>,
    last_quick_request: Mutex<Option<QuickPublishRequest>>,
}

#[derive(Clone, Default)]
struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    fn push_info(&self, result: ApiResult<VideoInfo>) {
        self.state.info.lock().unwrap().push_back(result);
    }

    fn push_download(&self, result: ApiResult<DownloadedVideo>) {
        self.state.downloads.lock().unwrap().push_back(result);
    }

    fn push_folders(&self, result: ApiResult<Vec<DriveFolder>>) {
        self.state.folders.lock().unwrap().push_back(result);
    }

    fn push_drive(&self, result: ApiResult<DriveUploadResult>) {
        self.state.drive.lock().unwrap().push_back(result);
    }

    fn push_publish(&self, result: ApiResult<PublishResult>) {
        self.state.publishes.lock().unwrap().push_back(result);
    }

    fn push_quick(&self, result: ApiResult<PublishResult>) {
        self.state.quick.lock().unwrap().push_back(result);
    }

    fn push_file(&self, chunks: Vec<Bytes>) {
        self.state.files.lock().unwrap().push_back(Ok(chunks));
    }
}

fn pop<T>(queue: &Mutex<VecDeque<ApiResult<T>>>, endpoint: &str) -> ApiResult<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unexpected call to {endpoint}"))
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn video_info(&self, _url: &str) -> ApiResult<VideoInfo> {
        self.state.info_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.state.info, "get_video_info")
    }

    async fn download(&self, _url: &str) -> ApiResult<DownloadedVideo> {
        self.state.download_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.state.downloads, "download")
    }

    async fn drive_folders(&self) -> ApiResult<Vec<DriveFolder>> {
        self.state.folder_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.state.folders, "get_drive_folders")
    }

    async fn upload_to_drive(&self, request: &DriveUploadRequest) -> ApiResult<DriveUploadResult> {
        self.state.drive_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_drive_request.lock().unwrap() = Some(request.clone());
        pop(&self.state.drive, "upload_to_drive")
    }

    async fn publish(&self, request: &PublishRequest) -> ApiResult<PublishResult> {
        self.state.publish_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_publish_request.lock().unwrap() = Some(request.clone());
        pop(&self.state.publishes, "upload_to_youtube")
    }

    async fn quick_publish(&self, request: &QuickPublishRequest) -> ApiResult<PublishResult> {
        self.state.quick_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_quick_request.lock().unwrap() = Some(request.clone());
        pop(&self.state.quick, "api/upload_to_yt")
    }

    async fn fetch_file(&self, _filename: &str) -> ApiResult<FileStream> {
        let chunks = pop(&self.state.files, "download_file")?;
        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }

    async fn history(&self) -> ApiResult<Vec<HistoryEntry>> {
        pop(&self.state.history, "history")
    }

    async fn logout(&self) -> ApiResult<()> {
        self.state.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn auth_url(&self) -> String {
        "http://mock/auth".to_string()
    }
}

fn test_info() -> VideoInfo {
    serde_json::from_str(r#"{"title":"Test","duration":125,"uploader":"X","thumbnail":""}"#)
        .unwrap()
}

fn test_download() -> DownloadedVideo {
    serde_json::from_str(
        r#"{"status":"success","filename":"abc.mp4","video_id":"abc","title":"Test"}"#,
    )
    .unwrap()
}

fn one_folder() -> Vec<DriveFolder> {
    vec![DriveFolder {
        id: "1".to_string(),
        name: "Videos".to_string(),
    }]
}

/// Fixture with metadata fetched and the download stored.
async fn downloaded_controller(backend: &MockBackend) -> WorkflowController<MockBackend> {
    let mut controller = WorkflowController::new(backend.clone());
    backend.push_info(Ok(test_info()));
    backend.push_download(Ok(test_download()));
    backend.push_folders(Ok(one_folder()));
    controller
        .fetch_metadata("https://youtu.be/abc")
        .await
        .unwrap();
    controller.start_download("https://youtu.be/abc").await.unwrap();
    controller
}

#[tokio::test]
async fn empty_url_never_issues_a_request() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());

    let err = controller.fetch_metadata("   ").await.unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.state.info_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_url_is_rejected_locally() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());

    let err = controller
        .fetch_metadata("https://vimeo.com/123")
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.state.info_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn metadata_renders_duration_and_placeholder_thumbnail() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());
    backend.push_info(Ok(test_info()));

    let info = controller
        .fetch_metadata("https://youtu.be/abc")
        .await
        .unwrap();
    assert_eq!(info.formatted_duration(), "2:05");
    assert!(info.thumbnail_or_placeholder().contains("placeholder"));
    assert!(controller.view().download_enabled);
}

#[tokio::test]
async fn download_requires_rendered_metadata() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());

    let err = controller
        .start_download("https://youtu.be/abc")
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.state.download_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn download_stores_session_values_unmodified_and_reveals_controls() {
    let backend = MockBackend::default();
    let controller = downloaded_controller(&backend).await;

    let session = controller.session().downloaded().unwrap();
    assert_eq!(session.filename, "abc.mp4");
    assert_eq!(session.video_id, VideoId::Text("abc".to_string()));

    assert!(controller.view().folder_picker_visible);
    assert!(controller.view().republish_visible);
    // Exactly one selectable non-placeholder option.
    assert_eq!(controller.view().folders, one_folder());
}

#[tokio::test]
async fn folder_listing_failure_after_download_is_swallowed() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());
    backend.push_info(Ok(test_info()));
    backend.push_download(Ok(test_download()));
    backend.push_folders(Err(ApiError::Application("not authed".to_string())));

    controller
        .fetch_metadata("https://youtu.be/abc")
        .await
        .unwrap();
    // The primary success path is not blocked.
    controller
        .start_download("https://youtu.be/abc")
        .await
        .unwrap();
    assert!(controller.view().folders.is_empty());
    assert!(controller.session().downloaded().is_some());
}

#[tokio::test]
async fn startup_folder_listing_surfaces_errors() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());
    backend.push_folders(Err(ApiError::server_error(401)));

    assert!(controller.list_folders_at_startup().await.is_err());
}

#[tokio::test]
async fn upload_requires_a_folder_selection() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;

    let err = controller.upload_to_drive("").await.unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.state.drive_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_requires_a_downloaded_session() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());

    let err = controller.upload_to_drive("1").await.unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.state.drive_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn drive_upload_sends_session_values_and_builds_view_link() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_drive(Ok(DriveUploadResult {
        file_id: Some("FILE123".to_string()),
    }));

    let result = controller.upload_to_drive("1").await.unwrap();
    assert_eq!(
        result.view_link().unwrap(),
        "https://drive.google.com/file/d/FILE123/view"
    );
    assert_eq!(controller.view().drive_link, result.view_link());

    let request = backend.state.last_drive_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.filename, "abc.mp4");
    assert_eq!(request.folder_id, "1");
    assert_eq!(request.video_id, VideoId::Text("abc".to_string()));
}

#[tokio::test]
async fn failed_upload_leaves_the_session_intact_for_retry() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_drive(Err(ApiError::Application("quota exceeded".to_string())));

    let err = controller.upload_to_drive("1").await.unwrap_err();
    assert_eq!(err.to_string(), "quota exceeded");
    assert_eq!(
        controller.session().downloaded().unwrap(),
        &test_download()
    );

    // Retry without re-downloading.
    backend.push_drive(Ok(DriveUploadResult {
        file_id: Some("F2".to_string()),
    }));
    controller.upload_to_drive("1").await.unwrap();
    assert_eq!(backend.state.download_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn republish_without_download_never_issues_a_request() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());

    assert!(matches!(
        controller.republish_original().await.unwrap_err(),
        FlowError::Validation(_)
    ));
    assert!(matches!(
        controller.republish_custom(PublishForm::default()).await.unwrap_err(),
        FlowError::Validation(_)
    ));
    assert_eq!(backend.state.quick_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.state.publish_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn republish_original_forces_private_visibility() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_quick(Ok(PublishResult {
        youtube_video_id: "YT123".to_string(),
    }));

    let result = controller.republish_original().await.unwrap();
    assert_eq!(result.watch_url(), "https://www.youtube.com/watch?v=YT123");

    let request = backend.state.last_quick_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.privacy_status, PrivacyStatus::Private);
    assert_eq!(request.filename, "abc.mp4");
    assert_eq!(request.video_id, VideoId::Text("abc".to_string()));
}

#[tokio::test]
async fn republish_custom_sends_the_form() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_publish(Ok(PublishResult {
        youtube_video_id: "YT9".to_string(),
    }));

    let form = PublishForm {
        title: "My title".to_string(),
        description: "desc".to_string(),
        tags: "a,b".to_string(),
        privacy_status: PrivacyStatus::Unlisted,
    };
    controller.republish_custom(form).await.unwrap();

    let request = backend.state.last_publish_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.title, "My title");
    assert_eq!(request.tags, "a,b");
    assert_eq!(request.privacy_status, PrivacyStatus::Unlisted);
    assert_eq!(controller.view().host_link.as_deref(), Some("https://www.youtube.com/watch?v=YT9"));
}

#[tokio::test]
async fn publish_success_emits_completion_event() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_quick(Ok(PublishResult {
        youtube_video_id: "YT1".to_string(),
    }));

    let mut events = controller.subscribe();
    controller.republish_original().await.unwrap();

    let mut saw_completion = false;
    while let Ok(event) = events.try_recv() {
        if let FlowEvent::PublishComplete { link } = event {
            assert_eq!(link, "https://www.youtube.com/watch?v=YT1");
            saw_completion = true;
        }
    }
    assert!(saw_completion);
}

#[tokio::test]
async fn publish_hides_progress_after_a_fixed_delay() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_quick(Ok(PublishResult {
        youtube_video_id: "YT1".to_string(),
    }));

    let mut events = controller.subscribe();
    controller.republish_original().await.unwrap();

    // The bar is still on screen right after completion and stays up while
    // the delay runs.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let mut hidden = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, FlowEvent::ProgressHidden { .. }) {
            hidden += 1;
        }
    }
    assert_eq!(hidden, 0);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let mut saw_hide = false;
    while let Ok(event) = events.try_recv() {
        if let FlowEvent::ProgressHidden { op } = event {
            assert_eq!(op, Operation::Republish);
            saw_hide = true;
        }
    }
    assert!(saw_hide);
}

#[tokio::test]
async fn a_new_republish_supersedes_the_pending_hide() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_quick(Ok(PublishResult {
        youtube_video_id: "YT1".to_string(),
    }));
    backend.push_quick(Ok(PublishResult {
        youtube_video_id: "YT2".to_string(),
    }));

    let mut events = controller.subscribe();
    controller.republish_original().await.unwrap();
    // Rerun immediately; the first run's pending hide must not fire under
    // the second run's bar.
    controller.republish_original().await.unwrap();

    tokio::time::sleep(Duration::from_millis(3000)).await;
    let mut hidden = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, FlowEvent::ProgressHidden { .. }) {
            hidden += 1;
        }
    }
    assert_eq!(hidden, 1);
}

#[tokio::test]
async fn reauth_signal_escalates_without_any_side_effect() {
    let backend = MockBackend::default();
    let mut controller = downloaded_controller(&backend).await;
    backend.push_quick(Err(ApiError::ReauthRequired {
        message: "missing scope".to_string(),
    }));

    let err = controller.republish_original().await.unwrap_err();
    assert!(err.needs_reauth());
    assert_eq!(err.to_string(), "missing scope");

    // Declining the prompt performs no navigation; the trigger stays usable.
    assert_eq!(backend.state.logout_calls.load(Ordering::SeqCst), 0);
    backend.push_quick(Ok(PublishResult {
        youtube_video_id: "YT2".to_string(),
    }));
    controller.republish_original().await.unwrap();

    // Accepting issues the logout.
    controller.logout().await.unwrap();
    assert_eq!(backend.state.logout_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn save_locally_streams_to_a_sanitized_title() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());
    backend.push_info(Ok(test_info()));
    backend.push_download(Ok(serde_json::from_str(
        r#"{"filename":"abc.mp4","video_id":"abc","title":"Test: Video?"}"#,
    )
    .unwrap()));
    backend.push_folders(Ok(one_folder()));
    controller
        .fetch_metadata("https://youtu.be/abc")
        .await
        .unwrap();
    controller.start_download("https://youtu.be/abc").await.unwrap();

    backend.push_file(vec![Bytes::from_static(b"hello "), Bytes::from_static(b"world")]);

    let dir = std::env::temp_dir().join(format!("ferry_save_test_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = controller.save_locally(&dir).await.unwrap();

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Test_ Video_.mp4")
    );
    let contents = tokio::fs::read(&path).await.unwrap();
    assert_eq!(contents, b"hello world");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn save_requires_a_downloaded_session() {
    let backend = MockBackend::default();
    let mut controller = WorkflowController::new(backend.clone());

    let err = controller
        .save_locally(std::env::temp_dir().as_path())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
}

#[tokio::test]
async fn history_passes_through() {
    let backend = MockBackend::default();
    let controller = WorkflowController::new(backend.clone());
    let entries: Vec<HistoryEntry> = serde_json::from_str(
        r#"[{"id":1,"title":"Old","uploaded_to_drive":true,
             "download_date":"2026-08-01T10:00:00Z"}]"#,
    )
    .unwrap();
    backend.state.history.lock().unwrap().push_back(Ok(entries));

    let history = controller.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].uploaded_to_drive);
    assert_eq!(history[0].id, VideoId::Numeric(1));
}
