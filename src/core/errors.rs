use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Caught before any request is issued; never reaches the network.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::Api(api) if api.needs_reauth())
    }
}

pub type Result<T, E = FlowError> = std::result::Result<T, E>;
