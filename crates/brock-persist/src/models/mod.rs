mod thread;
mod message;
mod fitness;
mod schedule;

pub use thread::{NewThread, Thread, ThreadFlags, ThreadUpdate, GENERAL_CHECKIN_FLAG};
pub use message::{DBMessage, MessageMetadata, MessageQuery, Sender, SortOrder};
pub use fitness::{
    Activity, ActivityQuery, DailyNutrition, Goal, GoalQuery, NewActivity, NewGoal, NutritionQuery,
};
pub use schedule::CheckinSchedule;
