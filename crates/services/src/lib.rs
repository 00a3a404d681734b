#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use error::SessionError;

pub use sessions::{DayRow, ProgressSnapshot, ProgressTracker, SessionDetail, SessionService};
