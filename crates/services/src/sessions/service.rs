use std::sync::Arc;

use api::SessionApi;
use plan_core::{Session, SessionId, SessionSummary};

use super::tracker::ProgressTracker;
use crate::error::SessionError;

/// Backend-facing session facade that hides the transport from callers.
///
/// This service owns:
/// - the request-issuing capability (shared with every tracker it hands out)
///
/// It does **not** own per-session completion state; see [`ProgressTracker`].
#[derive(Clone)]
pub struct SessionService {
    api: Arc<dyn SessionApi>,
}

impl SessionService {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self { api }
    }

    /// Fetch one session with its raw plan payload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` when the fetch fails; unlike progress,
    /// the session itself is mandatory.
    pub async fn fetch_session(&self, id: SessionId) -> Result<Session, SessionError> {
        Ok(self.api.fetch_session(id).await?)
    }

    /// List saved sessions, newest first as the backend orders them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` when the listing request fails.
    pub async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>, SessionError> {
        Ok(self.api.list_sessions(limit).await?)
    }

    /// Rename a saved session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` when the write is rejected.
    pub async fn rename_session(&self, id: SessionId, title: &str) -> Result<(), SessionError> {
        Ok(self.api.rename_session(id, title).await?)
    }

    /// Delete a saved session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` when the write is rejected.
    pub async fn delete_session(&self, id: SessionId) -> Result<(), SessionError> {
        Ok(self.api.delete_session(id).await?)
    }

    /// Progress tracker bound to one session, sharing this service's backend.
    #[must_use]
    pub fn tracker(&self, id: SessionId) -> ProgressTracker {
        ProgressTracker::new(Arc::clone(&self.api), id)
    }
}
