use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flag marking the singleton thread that receives proactive check-ins
pub const GENERAL_CHECKIN_FLAG: &str = "is_general_checkin";

pub type ThreadFlags = BTreeMap<String, Value>;

/// Database-agnostic thread model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub flags: ThreadFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn flag(&self, key: &str) -> Option<&Value> {
        self.flags.get(key)
    }

    pub fn is_general_checkin(&self) -> bool {
        self.flag(GENERAL_CHECKIN_FLAG) == Some(&Value::Bool(true))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewThread {
    pub title: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub flags: ThreadFlags,
}

impl NewThread {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }
}

/// Partial thread update. Every update bumps `updated_at`, so the empty
/// update is a plain touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadUpdate {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub summary: Option<String>,
    /// Replaces the whole flag map
    pub flags: Option<ThreadFlags>,
}

impl ThreadUpdate {
    pub fn touch() -> Self {
        Self::default()
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Default::default()
        }
    }

    pub fn flags(flags: ThreadFlags) -> Self {
        Self {
            flags: Some(flags),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, thread: &mut Thread, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            thread.title = title;
        }
        if let Some(topic) = self.topic {
            thread.topic = Some(topic);
        }
        if let Some(summary) = self.summary {
            thread.summary = Some(summary);
        }
        if let Some(flags) = self.flags {
            thread.flags = flags;
        }
        thread.updated_at = now;
    }
}
