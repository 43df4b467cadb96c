use async_trait::async_trait;
use brock_types::TimeOfDay;
use chrono::{NaiveDate, Utc};
use mongodb::Client;
use serde_json::Value;

use crate::dbs::mongo::models::{MongoActivity, MongoGoal, MongoMessage, MongoThread};
use crate::dbs::mongo::repositories::{
    MongoCheckinRepository, MongoMessageRepository, MongoRecordRepository, MongoThreadRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{
    Activity, ActivityQuery, CheckinSchedule, DBMessage, DailyNutrition, Goal, GoalQuery,
    MessageQuery, NewActivity, NewGoal, NewThread, NutritionQuery, Thread, ThreadUpdate,
};
use crate::trait_client::PersistenceClient;

pub struct MongoPersistenceClient {
    thread_repo: MongoThreadRepository,
    message_repo: MongoMessageRepository,
    record_repo: MongoRecordRepository,
    checkin_repo: MongoCheckinRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database, "connected to MongoDB");

        Ok(Self {
            thread_repo: MongoThreadRepository::new(&client, database),
            message_repo: MongoMessageRepository::new(&client, database),
            record_repo: MongoRecordRepository::new(&client, database),
            checkin_repo: MongoCheckinRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let now = Utc::now();
        let thread = Thread {
            id: uuid::Uuid::new_v4().to_string(),
            title: thread.title,
            topic: thread.topic,
            summary: thread.summary,
            flags: thread.flags,
            created_at: now,
            updated_at: now,
        };
        self.thread_repo.insert(&MongoThread::from(thread.clone())).await?;
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.thread_repo.get(thread_id).await?.map(Into::into))
    }

    async fn list_threads(&self, limit: Option<u32>) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.list(limit).await?;
        Ok(threads.into_iter().map(Into::into).collect())
    }

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Thread> {
        self.thread_repo
            .update(thread_id, update)
            .await?
            .map(Into::into)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn find_threads_by_flag(&self, key: &str, value: &Value) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.find_by_flag(key, value).await?;
        Ok(threads.into_iter().map(Into::into).collect())
    }

    async fn save_message(&self, message: DBMessage) -> Result<()> {
        self.message_repo.insert(&MongoMessage::from(message)).await
    }

    async fn list_messages(&self, thread_id: &str, query: MessageQuery) -> Result<Vec<DBMessage>> {
        let messages = self.message_repo.list(thread_id, query).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn list_goals(&self, query: GoalQuery) -> Result<Vec<Goal>> {
        let goals = self.record_repo.list_goals(query).await?;
        Ok(goals.into_iter().map(Into::into).collect())
    }

    async fn create_goal(&self, goal: NewGoal) -> Result<Goal> {
        let goal = goal.into_goal(Utc::now());
        self.record_repo.insert_goal(&MongoGoal::from(goal.clone())).await?;
        Ok(goal)
    }

    async fn list_activities(&self, query: ActivityQuery) -> Result<Vec<Activity>> {
        let activities = self.record_repo.list_activities(query).await?;
        Ok(activities.into_iter().map(Into::into).collect())
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity> {
        if let Some(goal_id) = &activity.goal_id {
            if !self.record_repo.goal_exists(goal_id).await? {
                return Err(PersistError::GoalNotFound(goal_id.clone()));
            }
        }
        let activity = activity.into_activity(Utc::now());
        self.record_repo
            .insert_activity(&MongoActivity::from(activity.clone()))
            .await?;
        Ok(activity)
    }

    async fn list_daily_nutrition(&self, query: NutritionQuery) -> Result<Vec<DailyNutrition>> {
        let days = self.record_repo.list_nutrition(query).await?;
        Ok(days.into_iter().map(Into::into).collect())
    }

    async fn upsert_daily_nutrition(&self, day: DailyNutrition) -> Result<()> {
        self.record_repo.upsert_nutrition(&day.into()).await
    }

    async fn list_device_tokens(&self) -> Result<Vec<String>> {
        self.checkin_repo.list_tokens().await
    }

    async fn register_device_token(&self, token: &str) -> Result<()> {
        self.checkin_repo.register_token(token).await
    }

    async fn get_checkin_schedule(&self, date: NaiveDate) -> Result<Option<CheckinSchedule>> {
        Ok(self.checkin_repo.get_schedule(date).await?.map(Into::into))
    }

    async fn save_checkin_schedule(&self, schedule: CheckinSchedule) -> Result<()> {
        self.checkin_repo.save_schedule(&schedule.into()).await
    }

    async fn mark_checkin_sent(&self, date: NaiveDate, slot: TimeOfDay) -> Result<()> {
        let field = match slot {
            TimeOfDay::Morning => "morning_sent",
            TimeOfDay::Afternoon => "afternoon_sent",
        };
        if !self.checkin_repo.set_sent(date, field).await? {
            return Err(PersistError::ScheduleNotFound(date.to_string()));
        }
        Ok(())
    }
}
