use crate::api::DownloadedVideo;

use super::errors::{FlowError, Result};

/// The single in-memory record of the most recently downloaded video.
///
/// Created empty, populated wholesale from the download response, never
/// partially mutated. A failed upload leaves it intact so the user can retry
/// without re-downloading; it only resets with the process.
#[derive(Debug, Default)]
pub struct VideoSession {
    data: Option<DownloadedVideo>,
}

impl VideoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, video: DownloadedVideo) {
        self.data = Some(video);
    }

    pub fn downloaded(&self) -> Option<&DownloadedVideo> {
        self.data.as_ref()
    }

    /// The invariant every upload path relies on: `filename` and `video_id`
    /// are present exactly when a download response has been stored.
    pub fn require_downloaded(&self) -> Result<&DownloadedVideo> {
        self.data
            .as_ref()
            .ok_or_else(|| FlowError::validation("Please download a video first"))
    }
}
