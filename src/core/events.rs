use std::path::PathBuf;

use crate::progress::ProgressInfo;

/// Which long-running trigger a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DriveUpload,
    Republish,
}

/// Events the controller broadcasts to whatever front end is attached.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    MetadataLoaded {
        title: String,
    },
    DownloadComplete {
        filename: String,
    },
    FoldersLoaded {
        count: usize,
    },
    Progress {
        op: Operation,
        info: ProgressInfo,
    },
    /// The fixed-delay hide after a successful republish.
    ProgressHidden {
        op: Operation,
    },
    DriveUploadComplete {
        link: Option<String>,
    },
    PublishComplete {
        link: String,
    },
    Saved {
        path: PathBuf,
    },
}
