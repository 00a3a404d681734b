mod ids;
mod plan;
mod progress;
mod session;

pub use ids::{ParseIdError, SessionId};
pub use plan::{Day, Exercise, Plan, Resource, Video};
pub use progress::{ProgressSummary, completion_map};
pub use session::{Session, SessionSummary};
