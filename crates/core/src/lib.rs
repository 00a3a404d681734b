#![forbid(unsafe_code)]

pub mod model;
pub mod normalize;
pub mod percent;
pub mod text;

pub use model::{
    Day, Exercise, ParseIdError, Plan, ProgressSummary, Resource, Session, SessionId,
    SessionSummary, Video, completion_map,
};
pub use normalize::normalize;
pub use percent::parse_percent;
pub use text::title_case;
