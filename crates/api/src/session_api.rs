use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use plan_core::{Session, SessionId, SessionSummary};

use crate::error::ApiError;

/// Request-issuing capability over the sessions backend.
///
/// Everything downstream depends on this trait rather than on a concrete
/// transport, which keeps tracker and service layers testable without a
/// network.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Fetch one session with its raw plan payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the backend rejects the request or cannot be
    /// reached.
    async fn fetch_session(&self, id: SessionId) -> Result<Session, ApiError>;

    /// Fetch the raw progress body for a session.
    ///
    /// The body is returned unrefined; callers decide how much of its shape
    /// to trust.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on any non-success answer, including deployments
    /// without a progress endpoint at all.
    async fn fetch_progress(&self, id: SessionId) -> Result<Value, ApiError>;

    /// Mark a day of a session complete.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the write is rejected.
    async fn complete_day(&self, id: SessionId, day: u32) -> Result<(), ApiError>;

    /// Revert a day of a session to not completed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the write is rejected.
    async fn undo_day(&self, id: SessionId, day: u32) -> Result<(), ApiError>;

    /// List saved sessions, up to `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the listing request fails outright; rows
    /// that fail to parse are skipped, not surfaced.
    async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>, ApiError>;

    /// Rename a saved session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the write is rejected.
    async fn rename_session(&self, id: SessionId, title: &str) -> Result<(), ApiError>;

    /// Delete a saved session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the write is rejected.
    async fn delete_session(&self, id: SessionId) -> Result<(), ApiError>;
}

/// In-memory `SessionApi` for tests and offline development.
///
/// State is arranged directly through the helper methods; reads and writes
/// then behave like the live backend (404 for unknown sessions, progress
/// synthesized in the endpoint's shape) and can be switched to fail for
/// rollback testing.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<InMemoryState>>,
}

#[derive(Default)]
struct InMemoryState {
    sessions: HashMap<u64, Value>,
    summaries: Vec<SessionSummary>,
    completed: HashMap<u64, HashMap<u32, bool>>,
    total_days: HashMap<u64, u32>,
    progress_disabled: bool,
    fail_writes: bool,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session payload under an id.
    pub fn put_session(&self, id: SessionId, payload: Value) {
        self.lock().sessions.insert(id.value(), payload);
    }

    /// Arrange the rows returned by `list_sessions`.
    pub fn put_summaries(&self, summaries: Vec<SessionSummary>) {
        self.lock().summaries = summaries;
    }

    /// Fix the plan length used when synthesizing progress bodies.
    pub fn set_total_days(&self, id: SessionId, total: u32) {
        self.lock().total_days.insert(id.value(), total);
    }

    /// Set a day's server-side completion state directly.
    pub fn set_day(&self, id: SessionId, day: u32, completed: bool) {
        self.lock()
            .completed
            .entry(id.value())
            .or_default()
            .insert(day, completed);
    }

    /// Server-side state of a day, if any write or arrangement recorded one.
    #[must_use]
    pub fn day_state(&self, id: SessionId, day: u32) -> Option<bool> {
        self.lock()
            .completed
            .get(&id.value())
            .and_then(|days| days.get(&day))
            .copied()
    }

    /// Make the progress endpoint answer 404, as deployments without one do.
    pub fn disable_progress(&self) {
        self.lock().progress_disabled = true;
    }

    /// Reject all subsequent writes with a server error.
    pub fn fail_writes(&self) {
        self.lock().fail_writes = true;
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InMemoryState {
    /// Synthesize the progress body the live endpoint would emit.
    fn progress_body(&self, id: u64) -> Value {
        let days = self.completed.get(&id).cloned().unwrap_or_default();
        let recorded = u32::try_from(days.len()).unwrap_or(u32::MAX);
        let total = self
            .total_days
            .get(&id)
            .copied()
            .unwrap_or(0)
            .max(recorded)
            .max(1);
        let done = u32::try_from(
            days.iter()
                .filter(|(day, completed)| **completed && **day <= total)
                .count(),
        )
        .unwrap_or(u32::MAX);
        let pct = (f64::from(done) * 100.0 / f64::from(total)).round();

        let breakdown: serde_json::Map<String, Value> = days
            .iter()
            .map(|(day, completed)| {
                (
                    format!("day_{day}"),
                    json!({"completed": completed, "completed_at": Value::Null}),
                )
            })
            .collect();

        json!({
            "session_id": id,
            "total_days": total,
            "completed": done,
            "not_completed": total - done,
            "progress_in_percent": format!("{pct}%"),
            "breakdown": breakdown,
        })
    }
}

fn not_found(message: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::NOT_FOUND,
        message: message.to_owned(),
    }
}

fn write_rejected() -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "write rejected".to_owned(),
    }
}

#[async_trait]
impl SessionApi for InMemoryApi {
    async fn fetch_session(&self, id: SessionId) -> Result<Session, ApiError> {
        self.lock()
            .sessions
            .get(&id.value())
            .cloned()
            .map(|payload| Session::new(id, payload))
            .ok_or_else(|| not_found("Session not found"))
    }

    async fn fetch_progress(&self, id: SessionId) -> Result<Value, ApiError> {
        let state = self.lock();
        if state.progress_disabled {
            return Err(not_found("Not Found"));
        }
        Ok(state.progress_body(id.value()))
    }

    async fn complete_day(&self, id: SessionId, day: u32) -> Result<(), ApiError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(write_rejected());
        }
        state
            .completed
            .entry(id.value())
            .or_default()
            .insert(day, true);
        Ok(())
    }

    async fn undo_day(&self, id: SessionId, day: u32) -> Result<(), ApiError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(write_rejected());
        }
        state
            .completed
            .entry(id.value())
            .or_default()
            .insert(day, false);
        Ok(())
    }

    async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>, ApiError> {
        let state = self.lock();
        Ok(state
            .summaries
            .iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn rename_session(&self, id: SessionId, title: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(write_rejected());
        }
        let Some(payload) = state.sessions.get_mut(&id.value()) else {
            return Err(not_found("Session not found"));
        };
        if let Value::Object(fields) = payload {
            fields.insert("title".to_owned(), Value::String(title.to_owned()));
        }
        for summary in &mut state.summaries {
            if summary.id == id {
                summary.title = title.to_owned();
            }
        }
        Ok(())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), ApiError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(write_rejected());
        }
        if state.sessions.remove(&id.value()).is_none() {
            return Err(not_found("Session not found"));
        }
        state.summaries.retain(|summary| summary.id != id);
        state.completed.remove(&id.value());
        state.total_days.remove(&id.value());
        Ok(())
    }
}
