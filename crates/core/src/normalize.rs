//! Best-effort normalization of raw session payloads into [`Plan`].
//!
//! Backend plan payloads are not stable: the plan may sit under several
//! different keys, may itself be a JSON-encoded string, and the day list may
//! arrive as a `day_N`-keyed map or as an array nested one of six ways. This
//! module reduces every observed shape to one canonical ordered day list.
//! It never fails; input it cannot use degrades to an empty plan.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::model::{Day, Exercise, Plan, Resource, Video};

/// Keys tried, in order, for the raw plan payload inside a session.
const PLAN_KEYS: [&str; 4] = ["plan", "plan_json", "data", "roadmap"];

/// Canonical `{overview, days}` view of a raw session payload.
///
/// Pure and deterministic: the same input yields the same plan on every
/// call, so callers may memoize on the payload alone. Extraction is
/// best-effort throughout; no field beyond the one being probed is ever
/// assumed to exist.
#[must_use]
pub fn normalize(session: &Value) -> Plan {
    let raw = PLAN_KEYS
        .iter()
        .find_map(|key| session.get(key).filter(|v| !v.is_null()))
        .unwrap_or(session);

    // A stringified plan is parsed; if that fails the string stays as the
    // plan value, which simply yields nothing downstream.
    let plan: Cow<'_, Value> = match raw {
        Value::String(text) => {
            serde_json::from_str::<Value>(text).map_or(Cow::Borrowed(raw), Cow::Owned)
        }
        _ => Cow::Borrowed(raw),
    };

    let overview = resolve_overview(session, &plan);

    let mut days = map_form_days(plan.get("data"));
    if days.is_empty() {
        days = map_form_days(session.get("data"));
    }
    if days.is_empty() {
        days = array_form_days(session, &plan);
    }

    Plan { overview, days }
}

fn resolve_overview(session: &Value, plan: &Value) -> String {
    let candidates = [
        plan.get("overview"),
        plan.pointer("/roadmap/overview"),
        session.get("overview"),
        session.pointer("/plan/overview"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.is_null())
        .and_then(scalar_string)
        .unwrap_or_default()
}

/// Day entries from a `day_N`-keyed map. Empty when the source is not an
/// object or no key qualifies.
fn map_form_days(source: Option<&Value>) -> Vec<Day> {
    let Some(Value::Object(entries)) = source else {
        return Vec::new();
    };

    let mut days: Vec<Day> = Vec::new();
    for (key, value) in entries {
        let Value::Object(fields) = value else {
            continue;
        };
        let Some(from_key) = day_key_number(key) else {
            continue;
        };
        // An explicit `day` field inside the object overrides the key; an
        // unusable one discards the entry, as does a key number of zero.
        let number = match fields.get("day") {
            Some(inner) => positive_day(inner),
            None => Some(from_key).filter(|n| *n > 0),
        };
        let Some(number) = number else {
            continue;
        };
        days.push(day_from_fields(number, fields));
    }
    days.sort_by_key(|d| d.day);
    days
}

/// Day entries from the first array candidate whose every element is an
/// object. Elements without a usable `day` number get their position + 1.
fn array_form_days(session: &Value, plan: &Value) -> Vec<Day> {
    let candidates = [
        plan.pointer("/roadmap/days"),
        plan.get("days"),
        session.pointer("/plan/roadmap/days"),
        session.pointer("/plan/days"),
        session.pointer("/roadmap/days"),
        session.get("days"),
    ];
    let Some(items) = candidates.into_iter().flatten().find_map(day_array) else {
        return Vec::new();
    };

    let mut days: Vec<Day> = items
        .iter()
        .enumerate()
        .map(|(index, fields)| {
            let number = fields
                .get("day")
                .and_then(positive_day)
                .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX));
            day_from_fields(number, fields)
        })
        .collect();
    days.sort_by_key(|d| d.day);
    days
}

/// The candidate qualifies only when it is a non-empty array of objects.
fn day_array(value: &Value) -> Option<Vec<&Map<String, Value>>> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    items.iter().map(Value::as_object).collect()
}

/// Day number from a `day_N`-style key: case-insensitive `day`, at most one
/// `_`/space/`-` separator, then digits to the end of the key.
fn day_key_number(key: &str) -> Option<u32> {
    if !key.get(..3)?.eq_ignore_ascii_case("day") {
        return None;
    }
    let rest = &key[3..];
    let digits = rest
        .strip_prefix(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .unwrap_or(rest);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Positive day number from an explicit `day` value; numeric strings coerce.
fn positive_day(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
    .filter(|n| *n > 0)
}

fn day_from_fields(number: u32, fields: &Map<String, Value>) -> Day {
    Day {
        day: number,
        topic: fields.get("topic").and_then(scalar_string),
        theme: fields.get("theme").and_then(scalar_string),
        title: fields.get("title").and_then(scalar_string),
        description: fields.get("description").and_then(scalar_string),
        resources: object_items(fields.get("resources"), resource_from_fields),
        videos: object_items(fields.get("videos"), video_from_fields),
        exercises: object_items(fields.get("exercises"), exercise_from_fields),
    }
}

fn object_items<T>(source: Option<&Value>, build: fn(&Map<String, Value>) -> T) -> Vec<T> {
    let Some(Value::Array(items)) = source else {
        return Vec::new();
    };
    items.iter().filter_map(Value::as_object).map(build).collect()
}

fn resource_from_fields(fields: &Map<String, Value>) -> Resource {
    Resource {
        title: fields.get("title").and_then(scalar_string),
        url: fields.get("url").and_then(scalar_string),
        why: fields.get("why").and_then(scalar_string),
    }
}

fn video_from_fields(fields: &Map<String, Value>) -> Video {
    Video {
        title: fields.get("title").and_then(scalar_string),
        url: fields.get("url").and_then(scalar_string),
        source: fields.get("source").and_then(scalar_string),
        duration: fields.get("duration").and_then(scalar_string),
        why: fields.get("why").and_then(scalar_string),
    }
}

fn exercise_from_fields(fields: &Map<String, Value>) -> Exercise {
    Exercise {
        title: fields.get("title").and_then(scalar_string),
        steps: fields.get("steps").map(step_strings).unwrap_or_default(),
        estimate_minutes: fields
            .get("estimate_minutes")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok()),
    }
}

fn step_strings(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items.iter().filter_map(scalar_string).collect()
}

/// String form of a scalar; `None` for null and structured values.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_form_extracts_and_sorts() {
        let session = json!({
            "data": {
                "day_2": {"topic": "B"},
                "day_1": {"topic": "A"},
                "dayX": {"topic": "ignored"},
            }
        });
        let plan = normalize(&session);
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].day, 1);
        assert_eq!(plan.days[0].topic.as_deref(), Some("A"));
        assert_eq!(plan.days[1].day, 2);
        assert_eq!(plan.days[1].topic.as_deref(), Some("B"));
    }

    #[test]
    fn map_form_wins_over_array_form() {
        let session = json!({
            "plan": {
                "data": {"day_1": {"topic": "from map"}},
                "roadmap": {"days": [{"topic": "from array"}]},
            }
        });
        let plan = normalize(&session);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].topic.as_deref(), Some("from map"));
    }

    #[test]
    fn map_form_key_variants() {
        let session = json!({
            "data": {
                "Day 3": {},
                "DAY-4": {},
                "day_05": {},
                "day6": {},
                "days_7": {},
                "day_8x": {},
                "day_0": {},
            }
        });
        let days: Vec<u32> = normalize(&session).days.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![3, 4, 5, 6]);
    }

    #[test]
    fn inner_day_field_overrides_key() {
        let session = json!({
            "data": {
                "day_1": {"day": 5, "topic": "moved"},
                "day_2": {"day": "7", "topic": "string day"},
                "day_3": {"day": 0, "topic": "dropped"},
                "day_4": {"day": null, "topic": "also dropped"},
            }
        });
        let plan = normalize(&session);
        let days: Vec<u32> = plan.days.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![5, 7]);
        assert_eq!(plan.days[0].topic.as_deref(), Some("moved"));
        assert_eq!(plan.days[1].topic.as_deref(), Some("string day"));
    }

    #[test]
    fn map_form_falls_back_to_session_data() {
        let session = json!({
            "plan": {"data": {}},
            "data": {"day_1": {"topic": "from session"}},
        });
        let plan = normalize(&session);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].topic.as_deref(), Some("from session"));
    }

    #[test]
    fn array_form_candidates_in_order() {
        let session = json!({
            "plan": {
                "roadmap": {"days": []},
                "days": [1, 2],
            },
            "roadmap": {"days": [{"topic": "winner"}]},
            "days": [{"topic": "too late"}],
        });
        // plan.roadmap.days is empty and plan.days holds non-objects, so the
        // first qualifying candidate is session.roadmap.days.
        let plan = normalize(&session);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].topic.as_deref(), Some("winner"));
    }

    #[test]
    fn array_form_numbers_by_position_and_sorts_explicit_days() {
        let session = json!({
            "days": [
                {"topic": "third", "day": 3},
                {"topic": "first", "day": 1},
                {"topic": "positional"},
            ]
        });
        let plan = normalize(&session);
        let days: Vec<(u32, &str)> = plan
            .days
            .iter()
            .map(|d| (d.day, d.topic.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(days, vec![(1, "first"), (3, "third"), (3, "positional")]);
    }

    #[test]
    fn plan_json_string_is_parsed() {
        let session = json!({
            "plan_json": "{\"overview\": \"ov\", \"data\": {\"day_1\": {\"topic\": \"t\"}}}"
        });
        let plan = normalize(&session);
        assert_eq!(plan.overview, "ov");
        assert_eq!(plan.days.len(), 1);
    }

    #[test]
    fn unparseable_plan_string_yields_empty_plan() {
        let session = json!({"plan": "not json at all"});
        let plan = normalize(&session);
        assert_eq!(plan, Plan::default());
    }

    #[test]
    fn overview_candidates_in_order() {
        let nested = json!({"plan": {"roadmap": {"overview": "nested"}}});
        assert_eq!(normalize(&nested).overview, "nested");

        let on_session = json!({"plan": {"days": [{"topic": "t"}]}, "overview": "top"});
        assert_eq!(normalize(&on_session).overview, "top");

        let numeric = json!({"overview": 12});
        assert_eq!(normalize(&numeric).overview, "12");

        let structured = json!({"plan": {"overview": {"text": "no"}}, "overview": "unreached"});
        // the first present candidate wins even when it degrades to empty
        assert_eq!(normalize(&structured).overview, "");
    }

    #[test]
    fn session_itself_can_be_the_plan() {
        let session = json!({"days": [{"topic": "direct"}]});
        let plan = normalize(&session);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].day, 1);
    }

    #[test]
    fn null_plan_candidates_are_skipped() {
        let session = json!({
            "plan": null,
            "plan_json": null,
            "data": {"day_1": {"topic": "found"}},
        });
        let plan = normalize(&session);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].topic.as_deref(), Some("found"));
    }

    #[test]
    fn day_fields_extract_leniently() {
        let session = json!({
            "data": {
                "day_1": {
                    "topic": 3,
                    "description": true,
                    "resources": [
                        {"title": "Guide", "url": "https://x", "why": "depth"},
                        "not an object",
                    ],
                    "videos": [{"title": "V", "source": "yt", "duration": "12m"}],
                    "exercises": [
                        {"title": "Drill", "steps": ["a", 2, {"nested": true}], "estimate_minutes": 30},
                        {"estimate_minutes": -5},
                    ],
                }
            }
        });
        let plan = normalize(&session);
        let day = &plan.days[0];
        assert_eq!(day.topic.as_deref(), Some("3"));
        assert_eq!(day.description.as_deref(), Some("true"));
        assert_eq!(day.resources.len(), 1);
        assert_eq!(day.resources[0].why.as_deref(), Some("depth"));
        assert_eq!(day.videos[0].source.as_deref(), Some("yt"));
        assert_eq!(day.exercises.len(), 2);
        assert_eq!(day.exercises[0].steps, vec!["a".to_string(), "2".to_string()]);
        assert_eq!(day.exercises[0].estimate_minutes, Some(30));
        assert_eq!(day.exercises[1].estimate_minutes, None);
    }

    #[test]
    fn missing_fields_stay_absent() {
        let session = json!({"data": {"day_1": {}}});
        let day = &normalize(&session).days[0];
        assert_eq!(day.display_title(), None);
        assert!(day.resources.is_empty());
        assert!(day.videos.is_empty());
        assert!(day.exercises.is_empty());
    }

    #[test]
    fn normalize_is_idempotent() {
        let session = json!({
            "title": "t",
            "data": {
                "overview": "ov",
                "data": {"day_2": {"topic": "B"}, "day_1": {"topic": "A"}},
            }
        });
        let first = normalize(&session);
        let second = normalize(&session);
        assert_eq!(first, second);
    }

    #[test]
    fn backend_shape_with_nested_data_normalizes() {
        // GET /sessions/{id} wraps the schedule as data.{overview, data}
        let session = json!({
            "id": 7,
            "title": "learn rust",
            "data": {
                "overview": "Two weeks of Rust.",
                "data": {
                    "day_1": {"topic": "setup", "resources": [{"title": "Book", "url": "https://doc"}]},
                    "day_2": {"topic": "ownership"},
                }
            },
            "progress": {"day_1": "completed"},
        });
        let plan = normalize(&session);
        assert_eq!(plan.overview, "Two weeks of Rust.");
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].topic.as_deref(), Some("setup"));
    }

    #[test]
    fn non_object_session_yields_empty_plan() {
        assert_eq!(normalize(&json!("just a string")), Plan::default());
        assert_eq!(normalize(&json!(42)), Plan::default());
        assert_eq!(normalize(&json!(null)), Plan::default());
    }
}
