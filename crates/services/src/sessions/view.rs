use serde::Serialize;

use plan_core::{
    Day, Exercise, Plan, ProgressSummary, Resource, Session, SessionId, Video, title_case,
};

use super::tracker::ProgressSnapshot;

/// Presentation-agnostic detail view of one session.
///
/// This is intentionally **not** a UI view-model:
/// - no layout or widget assumptions
/// - no localization
///
/// Day titles are the one piece of display shaping it does (title casing);
/// everything else passes through so front ends can format as they need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetail {
    pub id: SessionId,
    pub title: String,
    pub overview: Option<String>,
    pub days: Vec<DayRow>,
    pub summary: Option<ProgressSummary>,
}

/// One plan day merged with its tracked completion state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub day: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub resources: Vec<Resource>,
    pub videos: Vec<Video>,
    pub exercises: Vec<Exercise>,
    pub completed: bool,
    pub pending: bool,
}

impl SessionDetail {
    #[must_use]
    pub fn from_parts(session: &Session, plan: &Plan, snapshot: &ProgressSnapshot) -> Self {
        Self {
            id: session.id(),
            title: session.title().unwrap_or("Session").to_owned(),
            overview: (!plan.overview.is_empty()).then(|| plan.overview.clone()),
            days: plan
                .days
                .iter()
                .map(|day| DayRow::from_day(day, snapshot))
                .collect(),
            summary: snapshot.summary,
        }
    }
}

impl DayRow {
    #[must_use]
    pub fn from_day(day: &Day, snapshot: &ProgressSnapshot) -> Self {
        Self {
            day: day.day,
            title: day
                .display_title()
                .map(title_case)
                .filter(|title| !title.is_empty()),
            description: day
                .description
                .clone()
                .filter(|text| !text.is_empty()),
            resources: day.resources.clone(),
            videos: day.videos.clone(),
            exercises: day.exercises.clone(),
            completed: snapshot.completion.get(&day.day).copied().unwrap_or(false),
            pending: snapshot.pending.contains(&day.day),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bare_day(day: u32) -> Day {
        Day {
            day,
            topic: None,
            theme: None,
            title: None,
            description: None,
            resources: Vec::new(),
            videos: Vec::new(),
            exercises: Vec::new(),
        }
    }

    fn snapshot_with(completion: &[(u32, bool)], pending: &[u32]) -> ProgressSnapshot {
        ProgressSnapshot {
            completion: completion.iter().copied().collect(),
            summary: None,
            pending: pending.iter().copied().collect(),
        }
    }

    #[test]
    fn detail_uses_fallback_title_and_hides_empty_overview() {
        let session = Session::new(SessionId::new(1), json!({}));
        let plan = Plan::default();

        let detail = SessionDetail::from_parts(&session, &plan, &ProgressSnapshot::default());
        assert_eq!(detail.title, "Session");
        assert_eq!(detail.overview, None);
        assert!(detail.days.is_empty());
        assert_eq!(detail.summary, None);
    }

    #[test]
    fn detail_keeps_session_title_untouched() {
        let session = Session::new(SessionId::new(1), json!({"title": "  learn sql  "}));
        let plan = Plan {
            overview: "Two weeks.".to_owned(),
            days: Vec::new(),
        };

        let detail = SessionDetail::from_parts(&session, &plan, &ProgressSnapshot::default());
        // Trimmed but not cased; casing applies to day titles only.
        assert_eq!(detail.title, "learn sql");
        assert_eq!(detail.overview.as_deref(), Some("Two weeks."));
    }

    #[test]
    fn day_titles_are_display_cased() {
        let mut day = bare_day(1);
        day.topic = Some("intro to the sql basics".to_owned());

        let row = DayRow::from_day(&day, &ProgressSnapshot::default());
        assert_eq!(row.title.as_deref(), Some("Intro to the Sql Basics"));
    }

    #[test]
    fn blank_titles_and_descriptions_become_absent() {
        let mut day = bare_day(2);
        day.topic = Some("   ".to_owned());
        day.description = Some(String::new());

        let row = DayRow::from_day(&day, &ProgressSnapshot::default());
        assert_eq!(row.title, None);
        assert_eq!(row.description, None);
    }

    #[test]
    fn rows_merge_completion_and_pending_state() {
        let plan = Plan {
            overview: String::new(),
            days: vec![bare_day(1), bare_day(2), bare_day(3)],
        };
        let session = Session::new(SessionId::new(1), json!({}));
        let snapshot = snapshot_with(&[(1, true), (2, false)], &[2]);

        let detail = SessionDetail::from_parts(&session, &plan, &snapshot);
        assert!(detail.days[0].completed);
        assert!(!detail.days[0].pending);
        assert!(!detail.days[1].completed);
        assert!(detail.days[1].pending);
        // Days the server never mentioned default to not completed.
        assert!(!detail.days[2].completed);
    }

    #[test]
    fn detail_serializes_as_plain_json() {
        let mut day = bare_day(1);
        day.topic = Some("setup".to_owned());
        let plan = Plan {
            overview: "Go.".to_owned(),
            days: vec![day],
        };
        let session = Session::new(SessionId::new(7), json!({"title": "Go"}));
        let snapshot = snapshot_with(&[(1, true)], &[]);

        let value =
            serde_json::to_value(SessionDetail::from_parts(&session, &plan, &snapshot)).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["days"][0]["title"], "Setup");
        assert_eq!(value["days"][0]["completed"], true);
        assert_eq!(value["days"][0]["pending"], false);
    }
}
