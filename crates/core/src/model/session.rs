use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::SessionId;
use crate::model::plan::Plan;
use crate::normalize;

/// A saved learning session as the backend returned it.
///
/// The payload stays raw JSON on purpose: its shape is owned by the backend
/// and has drifted across producer versions. [`Session::plan`] derives the
/// canonical view from it without ever failing.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    payload: Value,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId, payload: Value) -> Self {
        Self { id, payload }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Raw backend payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Trimmed session title, when the payload carries a non-blank string one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.payload
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    /// Canonical plan view of the payload.
    ///
    /// Recomputed on every call; pure, so callers may cache per payload.
    #[must_use]
    pub fn plan(&self) -> Plan {
        normalize::normalize(&self.payload)
    }
}

/// One row of the session list endpoint.
///
/// Only `id` is required. Everything else tolerates absence so a single
/// incomplete row cannot take down a whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    #[serde(default)]
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub duration_days: Option<u32>,
    pub daily_minutes: Option<u32>,
}
