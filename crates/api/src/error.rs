//! Error surface of the sessions backend client.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The backend answered with a non-success status. The message is the
    /// display string reduced from the response body.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Build the error for a failed response from its status and decoded
    /// body (`Value::Null` when the body was absent or not JSON).
    #[must_use]
    pub fn from_response(status: StatusCode, body: &Value) -> Self {
        ApiError::Status {
            status,
            message: error_message(status, body),
        }
    }

    /// Status code of the failure, when one was received at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status(),
        }
    }
}

/// Reduce an error body to a single display string.
///
/// Backends answer with several shapes: a `detail` string, a `detail` array
/// of validation items, or `error`/`message` fields. Anything else falls
/// back to a generic line carrying the status code.
fn error_message(status: StatusCode, body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(detail)) => return detail.clone(),
        Some(Value::Array(items)) => {
            return items
                .iter()
                .map(detail_line)
                .collect::<Vec<_>>()
                .join("\n");
        }
        _ => {}
    }
    if let Some(Value::String(error)) = body.get("error") {
        return error.clone();
    }
    if let Some(Value::String(message)) = body.get("message") {
        return message.clone();
    }
    format!("Request failed with status {}", status.as_u16())
}

/// One validation item: its `msg`, else its `type`, else the item as JSON.
fn detail_line(item: &Value) -> String {
    let msg = item
        .get("msg")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let kind = item
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    msg.or(kind)
        .map_or_else(|| item.to_string(), ToOwned::to_owned)
}
