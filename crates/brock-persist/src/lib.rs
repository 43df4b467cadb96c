pub mod models;
pub mod error;
pub mod trait_client;
pub mod dbs;

pub use models::{
    Activity, ActivityQuery, CheckinSchedule, DBMessage, DailyNutrition, Goal, GoalQuery,
    MessageMetadata, MessageQuery, NewActivity, NewGoal, NewThread, NutritionQuery, Sender,
    SortOrder, Thread, ThreadFlags, ThreadUpdate, GENERAL_CHECKIN_FLAG,
};
pub use error::{PersistError, Result};
pub use trait_client::PersistenceClient;
pub use dbs::memory::MemoryPersistenceClient;

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
