mod controller;
mod errors;
mod events;
mod session;

pub use controller::{ViewState, WorkflowController};
pub use errors::{FlowError, Result};
pub use events::{FlowEvent, Operation};
pub use session::VideoSession;
