pub mod api;
pub mod config;
pub mod core;
pub mod progress;
pub mod ui;
pub mod utils;

// Re-export the surface the binary and tests actually use
pub use crate::core::{
    FlowError,
    FlowEvent,
    Result,
    VideoSession,
    ViewState,
    WorkflowController,
};

pub use api::{
    ApiError,
    Backend,
    HttpBackend,
};

pub use progress::{
    ProgressInfo,
    ProgressProfile,
    SimulatedProgress,
};
