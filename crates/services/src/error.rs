//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a toggle for day {day} is already in flight")]
    ToggleInFlight { day: u32 },
    #[error(transparent)]
    Api(#[from] ApiError),
}
