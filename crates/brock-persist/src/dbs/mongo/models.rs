use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    Activity, CheckinSchedule, DBMessage, DailyNutrition, Goal, MessageMetadata, Sender, Thread,
    ThreadFlags,
};

// MongoDB documents. Ids stay UUID strings so they round-trip unchanged
// through the HTTP surface; timestamps are native BSON dates so they sort.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub flags: ThreadFlags,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub sender: Sender,
    pub content: String,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGoal {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub milestone_description: String,
    pub start_date: NaiveDate,
    pub milestone_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    pub image_system_name: String,
    #[serde(default)]
    pub is_manually_completed: bool,
    #[serde(default)]
    pub progress_data: Option<Value>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoActivity {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub goal_id: Option<String>,
    pub title: String,
    pub icon_name: String,
    pub activity_type: String,
    #[serde(default)]
    pub data: Value,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Keyed by ISO day, which also sorts chronologically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDailyNutrition {
    #[serde(rename = "_id")]
    pub day: NaiveDate,
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDeviceToken {
    #[serde(rename = "_id")]
    pub token: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCheckinSchedule {
    #[serde(rename = "_id")]
    pub date: NaiveDate,
    pub morning_time: NaiveTime,
    pub afternoon_time: NaiveTime,
    pub morning_sent: bool,
    pub afternoon_sent: bool,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<Thread> for MongoThread {
    fn from(t: Thread) -> Self {
        Self {
            id: t.id,
            title: t.title,
            topic: t.topic,
            summary: t.summary,
            flags: t.flags,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(t: MongoThread) -> Self {
        Self {
            id: t.id,
            title: t.title,
            topic: t.topic,
            summary: t.summary,
            flags: t.flags,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<DBMessage> for MongoMessage {
    fn from(m: DBMessage) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            sender: m.sender,
            content: m.content,
            metadata: m.metadata,
            created_at: m.created_at,
        }
    }
}

impl From<MongoMessage> for DBMessage {
    fn from(m: MongoMessage) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            sender: m.sender,
            content: m.content,
            metadata: m.metadata,
            created_at: m.created_at,
        }
    }
}

impl From<Goal> for MongoGoal {
    fn from(g: Goal) -> Self {
        Self {
            id: g.id,
            name: g.name,
            milestone_description: g.milestone_description,
            start_date: g.start_date,
            milestone_date: g.milestone_date,
            reason: g.reason,
            image_system_name: g.image_system_name,
            is_manually_completed: g.is_manually_completed,
            progress_data: g.progress_data,
            created_at: g.created_at,
        }
    }
}

impl From<MongoGoal> for Goal {
    fn from(g: MongoGoal) -> Self {
        Self {
            id: g.id,
            name: g.name,
            milestone_description: g.milestone_description,
            start_date: g.start_date,
            milestone_date: g.milestone_date,
            reason: g.reason,
            image_system_name: g.image_system_name,
            is_manually_completed: g.is_manually_completed,
            progress_data: g.progress_data,
            created_at: g.created_at,
        }
    }
}

impl From<Activity> for MongoActivity {
    fn from(a: Activity) -> Self {
        Self {
            id: a.id,
            goal_id: a.goal_id,
            title: a.title,
            icon_name: a.icon_name,
            activity_type: a.activity_type,
            data: a.data,
            created_at: a.created_at,
        }
    }
}

impl From<MongoActivity> for Activity {
    fn from(a: MongoActivity) -> Self {
        Self {
            id: a.id,
            goal_id: a.goal_id,
            title: a.title,
            icon_name: a.icon_name,
            activity_type: a.activity_type,
            data: a.data,
            created_at: a.created_at,
        }
    }
}

impl From<DailyNutrition> for MongoDailyNutrition {
    fn from(n: DailyNutrition) -> Self {
        Self {
            day: n.day,
            calories_kcal: n.calories_kcal,
            protein_g: n.protein_g,
            carbs_g: n.carbs_g,
            fat_g: n.fat_g,
        }
    }
}

impl From<MongoDailyNutrition> for DailyNutrition {
    fn from(n: MongoDailyNutrition) -> Self {
        Self {
            day: n.day,
            calories_kcal: n.calories_kcal,
            protein_g: n.protein_g,
            carbs_g: n.carbs_g,
            fat_g: n.fat_g,
        }
    }
}

impl From<CheckinSchedule> for MongoCheckinSchedule {
    fn from(s: CheckinSchedule) -> Self {
        Self {
            date: s.date,
            morning_time: s.morning_time,
            afternoon_time: s.afternoon_time,
            morning_sent: s.morning_sent,
            afternoon_sent: s.afternoon_sent,
        }
    }
}

impl From<MongoCheckinSchedule> for CheckinSchedule {
    fn from(s: MongoCheckinSchedule) -> Self {
        Self {
            date: s.date,
            morning_time: s.morning_time,
            afternoon_time: s.afternoon_time,
            morning_sent: s.morning_sent,
            afternoon_sent: s.afternoon_sent,
        }
    }
}
