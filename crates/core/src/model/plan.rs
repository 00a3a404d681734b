use serde::Serialize;

/// Canonical view of a session's content: overview plus ordered days.
///
/// Always derived (see [`crate::normalize`]), never stored or synced back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Free-form overview text; empty when the payload had none.
    pub overview: String,
    /// Day entries, sorted ascending by day number.
    pub days: Vec<Day>,
}

/// One unit of a plan.
///
/// Every field except `day` is optional: a day object may carry any subset
/// of them, and consumers must not assume more than what was present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Day {
    /// Positive, 1-based, unique within a plan; need not be contiguous.
    pub day: u32,
    pub topic: Option<String>,
    pub theme: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub resources: Vec<Resource>,
    pub videos: Vec<Video>,
    pub exercises: Vec<Exercise>,
}

impl Day {
    /// Display heading for the day: topic, then theme, then title.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .or(self.theme.as_deref())
            .or(self.title.as_deref())
    }
}

/// A reading or reference link attached to a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub title: Option<String>,
    pub url: Option<String>,
    pub why: Option<String>,
}

/// A video attached to a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub duration: Option<String>,
    pub why: Option<String>,
}

/// A hands-on exercise attached to a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub title: Option<String>,
    pub steps: Vec<String>,
    pub estimate_minutes: Option<u32>,
}
