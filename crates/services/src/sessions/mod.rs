mod service;
mod tracker;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use service::SessionService;
pub use tracker::{ProgressSnapshot, ProgressTracker};
pub use view::{DayRow, SessionDetail};
