mod client;
mod errors;
mod types;

pub use client::{Backend, FileStream, HttpBackend};
pub use errors::{ApiError, Result};
pub use types::{
    DownloadedVideo, DriveFolder, DriveUploadRequest, DriveUploadResult, HistoryEntry,
    PrivacyStatus, PublishForm, PublishRequest, PublishResult, QuickPublishRequest, VideoId,
    VideoInfo, THUMBNAIL_PLACEHOLDER,
};
