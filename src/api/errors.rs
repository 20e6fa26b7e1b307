use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP Request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Server responded with status: {status_code}")]
    ServerError {
        status_code: u16,
    },

    #[error("Could not parse server response: {0}")]
    MalformedResponse(String),

    /// The backend returned an `error` field; its text is surfaced verbatim.
    #[error("{0}")]
    Application(String),

    /// `error` plus `action_required: "reauth"` in the body.
    #[error("{message}")]
    ReauthRequired {
        message: String,
    },

    #[error("Could not retrieve video information. Please try another video.")]
    MissingTitle,

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    pub fn server_error(status_code: u16) -> Self {
        Self::ServerError { status_code }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Whether the backend is asking the user to re-authenticate.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::ReauthRequired { .. })
    }
}

/// Error alias
pub type Result<T, E = ApiError> = std::result::Result<T, E>;
