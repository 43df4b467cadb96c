use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_GOAL_ICON: &str = "target";
pub const DEFAULT_ACTIVITY_TYPE: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub milestone_description: String,
    pub start_date: NaiveDate,
    pub milestone_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub image_system_name: String,
    #[serde(default)]
    pub is_manually_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn is_active(&self) -> bool {
        !self.is_manually_completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub name: String,
    pub milestone_description: String,
    pub start_date: NaiveDate,
    pub milestone_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "default_goal_icon")]
    pub image_system_name: String,
}

fn default_goal_icon() -> String {
    DEFAULT_GOAL_ICON.to_string()
}

impl NewGoal {
    pub(crate) fn into_goal(self, now: DateTime<Utc>) -> Goal {
        Goal {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            milestone_description: self.milestone_description,
            start_date: self.start_date,
            milestone_date: self.milestone_date,
            reason: self.reason,
            image_system_name: self.image_system_name,
            is_manually_completed: false,
            progress_data: None,
            created_at: now,
        }
    }
}

/// Goal listing, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct GoalQuery {
    pub limit: u32,
    pub active_only: bool,
}

impl GoalQuery {
    pub fn recent(limit: u32) -> Self {
        Self {
            limit,
            active_only: false,
        }
    }

    pub fn active(limit: u32) -> Self {
        Self {
            limit,
            active_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub title: String,
    pub icon_name: String,
    pub activity_type: String,
    #[serde(default)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub title: String,
    pub icon_name: String,
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default = "default_activity_type")]
    pub activity_type: String,
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn default_activity_type() -> String {
    DEFAULT_ACTIVITY_TYPE.to_string()
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl NewActivity {
    pub(crate) fn into_activity(self, now: DateTime<Utc>) -> Activity {
        Activity {
            id: uuid::Uuid::new_v4().to_string(),
            goal_id: self.goal_id,
            title: self.title,
            icon_name: self.icon_name,
            activity_type: self.activity_type,
            data: self.data,
            created_at: now,
        }
    }
}

/// Activity listing, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityQuery {
    pub goal_id: Option<String>,
    pub activity_type: Option<String>,
    pub limit: u32,
}

impl ActivityQuery {
    pub fn recent(limit: u32) -> Self {
        Self {
            goal_id: None,
            activity_type: None,
            limit,
        }
    }

    pub(crate) fn matches(&self, activity: &Activity) -> bool {
        self.goal_id
            .as_ref()
            .map_or(true, |g| activity.goal_id.as_ref() == Some(g))
            && self
                .activity_type
                .as_ref()
                .map_or(true, |t| &activity.activity_type == t)
    }
}

/// Per-day nutrition totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub day: NaiveDate,
    #[serde(default)]
    pub calories_kcal: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NutritionQuery {
    /// The single day, if recorded
    Day(NaiveDate),
    /// Most recent days, newest first
    Recent { limit: u32 },
}
