use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::percent::parse_percent;

/// Aggregate progress for one session, refined from a progress response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total_days: u32,
    pub completed: u32,
    pub not_completed: u32,
    /// Always in `[0, 100]`, whatever representation the server used.
    pub percent: u8,
}

impl ProgressSummary {
    /// Read the aggregate fields out of a progress response body.
    ///
    /// Absent or non-numeric counters default to zero; the percent goes
    /// through [`parse_percent`] and so accepts `85`, `"85%"`, and worse.
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        Self {
            total_days: count_field(body, "total_days"),
            completed: count_field(body, "completed"),
            not_completed: count_field(body, "not_completed"),
            percent: parse_percent(body.get("progress_in_percent").unwrap_or(&Value::Null)),
        }
    }
}

fn count_field(body: &Value, key: &str) -> u32 {
    body.get(key)
        .and_then(Value::as_u64)
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Per-day completion map from a progress response body.
///
/// Breakdown keys are matched by their embedded digits, so `day_3`, `Day 3`
/// and a bare `3` all count as day 3; a key without digits is skipped, as is
/// day 0. Bodies without a `breakdown` object are scanned whole — older
/// backends emitted the mapping at the top level.
#[must_use]
pub fn completion_map(body: &Value) -> BTreeMap<u32, bool> {
    let source = match body.get("breakdown") {
        Some(Value::Object(breakdown)) => breakdown,
        _ => match body {
            Value::Object(top) => top,
            _ => return BTreeMap::new(),
        },
    };

    let mut days = BTreeMap::new();
    for (key, state) in source {
        let Some(day) = embedded_digits(key) else {
            continue;
        };
        days.insert(day, is_truthy(state.get("completed")));
    }
    days
}

/// Digits of a key, concatenated and parsed; `None` for no digits or zero.
fn embedded_digits(key: &str) -> Option<u32> {
    let digits: String = key.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Loose truthiness of the original client: false/0/""/null are falsy,
/// everything else (including objects) is truthy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
