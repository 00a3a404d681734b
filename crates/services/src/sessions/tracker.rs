use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use api::SessionApi;
use plan_core::{ProgressSummary, SessionId, completion_map};

use crate::error::SessionError;

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Point-in-time copy of a tracker's state, for building views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completion: BTreeMap<u32, bool>,
    pub summary: Option<ProgressSummary>,
    pub pending: BTreeSet<u32>,
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Optimistic per-day completion state for a single session.
///
/// Owns the client-side mirror of server completion truth: `load` replaces it
/// from the progress endpoint, `toggle` flips a day optimistically, confirms
/// the write against the backend and re-syncs. Cloning is cheap and clones
/// share state, so one tracker can back several concurrent views.
#[derive(Clone)]
pub struct ProgressTracker {
    api: Arc<dyn SessionApi>,
    session_id: SessionId,
    state: Arc<Mutex<TrackerState>>,
}

#[derive(Default)]
struct TrackerState {
    completion: BTreeMap<u32, bool>,
    summary: Option<ProgressSummary>,
    pending: BTreeSet<u32>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>, session_id: SessionId) -> Self {
        Self {
            api,
            session_id,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Refresh completion state from the backend.
    ///
    /// Best effort: the progress endpoint is optional, so a failure keeps the
    /// previous state and reports `false` instead of surfacing an error.
    ///
    /// Concurrent loads are safe; whichever response lands last wins, with no
    /// sequencing against in-flight toggles. A known race.
    pub async fn load(&self) -> bool {
        match self.api.fetch_progress(self.session_id).await {
            Ok(body) => {
                self.apply_progress_body(&body);
                true
            }
            Err(err) => {
                tracing::debug!(session_id = %self.session_id, %err, "progress refresh failed");
                false
            }
        }
    }

    /// Flip one day's completion state.
    ///
    /// `currently_done` is the state the caller is acting on. The flip is
    /// applied locally before the write goes out; on a confirmed write the
    /// map is re-synced from the server, on a failed write the flip is
    /// reverted. The day stays pending for the duration either way.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ToggleInFlight` when a toggle for the same day
    /// has not settled yet, and `SessionError::Api` when the write fails.
    pub async fn toggle(&self, day: u32, currently_done: bool) -> Result<(), SessionError> {
        {
            let mut state = self.lock();
            if !state.pending.insert(day) {
                return Err(SessionError::ToggleInFlight { day });
            }
            state.completion.insert(day, !currently_done);
        }

        let outcome = if currently_done {
            self.api.undo_day(self.session_id, day).await
        } else {
            self.api.complete_day(self.session_id, day).await
        };

        match outcome {
            Ok(()) => {
                // Server truth supersedes the optimistic flip when reachable.
                self.load().await;
                self.lock().pending.remove(&day);
                Ok(())
            }
            Err(err) => {
                let mut state = self.lock();
                state.completion.insert(day, currently_done);
                state.pending.remove(&day);
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn is_done(&self, day: u32) -> bool {
        self.lock().completion.get(&day).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_pending(&self, day: u32) -> bool {
        self.lock().pending.contains(&day)
    }

    #[must_use]
    pub fn summary(&self) -> Option<ProgressSummary> {
        self.lock().summary
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            completion: state.completion.clone(),
            summary: state.summary,
            pending: state.pending.clone(),
        }
    }

    fn apply_progress_body(&self, body: &Value) {
        let completion = completion_map(body);
        let summary = ProgressSummary::from_value(body);
        let mut state = self.lock();
        state.completion = completion;
        state.summary = Some(summary);
    }

    // The lock is only ever held between suspension points.
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ProgressTracker")
            .field("session_id", &self.session_id)
            .field("completion_len", &state.completion.len())
            .field("pending", &state.pending)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
