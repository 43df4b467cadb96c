use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use brock_types::TimeOfDay;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{
    Activity, ActivityQuery, CheckinSchedule, DBMessage, DailyNutrition, Goal, GoalQuery,
    MessageQuery, NewActivity, NewGoal, NewThread, NutritionQuery, SortOrder, Thread, ThreadUpdate,
};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct MemoryState {
    threads: Vec<Thread>,
    messages: Vec<DBMessage>,
    goals: Vec<Goal>,
    activities: Vec<Activity>,
    nutrition: BTreeMap<NaiveDate, DailyNutrition>,
    device_tokens: Vec<String>,
    schedules: BTreeMap<NaiveDate, CheckinSchedule>,
}

/// Process-local store. Collections are kept in insertion order, which is
/// also creation order, so ties on timestamps resolve deterministically.
#[derive(Default)]
pub struct MemoryPersistenceClient {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every operation fails with a connection error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistError::Connection("store is offline".to_string()));
        }
        Ok(())
    }
}

fn newest_first<T: Clone>(items: &[T], keep: impl Fn(&T) -> bool, limit: u32) -> Vec<T> {
    items
        .iter()
        .rev()
        .filter(|item| keep(item))
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        self.check_online()?;
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
        self.state.write().await.threads.push(thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state.threads.iter().find(|t| t.id == thread_id).cloned())
    }

    async fn list_threads(&self, limit: Option<u32>) -> Result<Vec<Thread>> {
        self.check_online()?;
        let state = self.state.read().await;
        let mut threads = state.threads.clone();
        // Stable sort keeps later-created threads ahead on equal timestamps
        threads.reverse();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(limit) = limit {
            threads.truncate(limit as usize);
        }
        Ok(threads)
    }

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Thread> {
        self.check_online()?;
        let mut state = self.state.write().await;
        let thread = state
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        update.apply(thread, Utc::now());
        Ok(thread.clone())
    }

    async fn find_threads_by_flag(&self, key: &str, value: &Value) -> Result<Vec<Thread>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state
            .threads
            .iter()
            .filter(|t| t.flags.get(key) == Some(value))
            .cloned()
            .collect())
    }

    async fn save_message(&self, message: DBMessage) -> Result<()> {
        self.check_online()?;
        self.state.write().await.messages.push(message);
        Ok(())
    }

    async fn list_messages(&self, thread_id: &str, query: MessageQuery) -> Result<Vec<DBMessage>> {
        self.check_online()?;
        let state = self.state.read().await;
        let in_thread = state.messages.iter().filter(|m| m.thread_id == thread_id);
        let ordered: Vec<&DBMessage> = match query.order {
            SortOrder::Ascending => in_thread.collect(),
            SortOrder::Descending => in_thread.rev().collect(),
        };
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(ordered
            .into_iter()
            .skip(query.offset as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_goals(&self, query: GoalQuery) -> Result<Vec<Goal>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(newest_first(
            &state.goals,
            |g| !query.active_only || g.is_active(),
            query.limit,
        ))
    }

    async fn create_goal(&self, goal: NewGoal) -> Result<Goal> {
        self.check_online()?;
        let goal = goal.into_goal(Utc::now());
        self.state.write().await.goals.push(goal.clone());
        Ok(goal)
    }

    async fn list_activities(&self, query: ActivityQuery) -> Result<Vec<Activity>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(newest_first(&state.activities, |a| query.matches(a), query.limit))
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity> {
        self.check_online()?;
        let mut state = self.state.write().await;
        if let Some(goal_id) = &activity.goal_id {
            if !state.goals.iter().any(|g| &g.id == goal_id) {
                return Err(PersistError::GoalNotFound(goal_id.clone()));
            }
        }
        let activity = activity.into_activity(Utc::now());
        state.activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_daily_nutrition(&self, query: NutritionQuery) -> Result<Vec<DailyNutrition>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(match query {
            NutritionQuery::Day(day) => state.nutrition.get(&day).cloned().into_iter().collect(),
            NutritionQuery::Recent { limit } => state
                .nutrition
                .values()
                .rev()
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }

    async fn upsert_daily_nutrition(&self, day: DailyNutrition) -> Result<()> {
        self.check_online()?;
        self.state.write().await.nutrition.insert(day.day, day);
        Ok(())
    }

    async fn list_device_tokens(&self) -> Result<Vec<String>> {
        self.check_online()?;
        Ok(self.state.read().await.device_tokens.clone())
    }

    async fn register_device_token(&self, token: &str) -> Result<()> {
        self.check_online()?;
        let mut state = self.state.write().await;
        if !state.device_tokens.iter().any(|t| t == token) {
            state.device_tokens.push(token.to_string());
        }
        Ok(())
    }

    async fn get_checkin_schedule(&self, date: NaiveDate) -> Result<Option<CheckinSchedule>> {
        self.check_online()?;
        Ok(self.state.read().await.schedules.get(&date).cloned())
    }

    async fn save_checkin_schedule(&self, schedule: CheckinSchedule) -> Result<()> {
        self.check_online()?;
        self.state.write().await.schedules.insert(schedule.date, schedule);
        Ok(())
    }

    async fn mark_checkin_sent(&self, date: NaiveDate, slot: TimeOfDay) -> Result<()> {
        self.check_online()?;
        let mut state = self.state.write().await;
        let schedule = state
            .schedules
            .get_mut(&date)
            .ok_or_else(|| PersistError::ScheduleNotFound(date.to_string()))?;
        schedule.mark_sent(slot);
        Ok(())
    }
}
