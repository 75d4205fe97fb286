pub mod ids;
pub mod money;

pub use ids::{CourseId, EventId, SessionId, UserId};
pub use money::Money;
