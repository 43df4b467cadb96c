use async_trait::async_trait;
use brock_types::TimeOfDay;
use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    Activity, ActivityQuery, CheckinSchedule, DBMessage, DailyNutrition, Goal, GoalQuery,
    MessageQuery, NewActivity, NewGoal, NewThread, NutritionQuery, Thread, ThreadUpdate,
};

/// Trait for datastore operations
///
/// Implementations provide database-specific storage. List operations order
/// by timestamp and honour the query's limit.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    // ---- threads ----

    async fn create_thread(&self, thread: NewThread) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Most recently updated first
    async fn list_threads(&self, limit: Option<u32>) -> Result<Vec<Thread>>;

    /// Apply a partial update and bump `updated_at`.
    /// Fails with `ThreadNotFound` for an unknown id.
    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Thread>;

    /// Threads whose flag `key` equals `value`
    async fn find_threads_by_flag(&self, key: &str, value: &Value) -> Result<Vec<Thread>>;

    /// Refresh `updated_at` only
    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        self.update_thread(thread_id, ThreadUpdate::touch()).await?;
        Ok(())
    }

    // ---- messages ----

    async fn save_message(&self, message: DBMessage) -> Result<()>;

    async fn list_messages(&self, thread_id: &str, query: MessageQuery) -> Result<Vec<DBMessage>>;

    /// Whether the thread already holds at least one message
    async fn has_messages(&self, thread_id: &str) -> Result<bool> {
        let existing = self.list_messages(thread_id, MessageQuery::latest(1)).await?;
        Ok(!existing.is_empty())
    }

    // ---- goals & activities ----

    async fn list_goals(&self, query: GoalQuery) -> Result<Vec<Goal>>;

    async fn create_goal(&self, goal: NewGoal) -> Result<Goal>;

    async fn list_activities(&self, query: ActivityQuery) -> Result<Vec<Activity>>;

    /// Fails with `GoalNotFound` when `goal_id` names no goal
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity>;

    // ---- nutrition ----

    async fn list_daily_nutrition(&self, query: NutritionQuery) -> Result<Vec<DailyNutrition>>;

    async fn upsert_daily_nutrition(&self, day: DailyNutrition) -> Result<()>;

    // ---- push device tokens ----

    async fn list_device_tokens(&self) -> Result<Vec<String>>;

    async fn register_device_token(&self, token: &str) -> Result<()>;

    // ---- check-in schedules ----

    async fn get_checkin_schedule(&self, date: NaiveDate) -> Result<Option<CheckinSchedule>>;

    async fn save_checkin_schedule(&self, schedule: CheckinSchedule) -> Result<()>;

    /// Fails with `ScheduleNotFound` when no schedule exists for `date`
    async fn mark_checkin_sent(&self, date: NaiveDate, slot: TimeOfDay) -> Result<()>;
}
