use brock_llm::{Message, ToolCall};
use brock_types::TimeOfDay;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Author of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    /// Stored as `brock`, the coach persona the mobile client renders
    #[serde(rename = "brock", alias = "assistant")]
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "brock",
        }
    }
}

/// Database-agnostic message model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DBMessage {
    pub id: String,
    pub thread_id: String,
    pub sender: Sender,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    pub created_at: DateTime<Utc>,
}

impl DBMessage {
    pub fn new(thread_id: impl Into<String>, sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            sender,
            content: content.into(),
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, Sender::User, content)
    }

    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, Sender::Assistant, content)
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<&DBMessage> for Message {
    fn from(message: &DBMessage) -> Self {
        match message.sender {
            Sender::User => Message::human(message.content.clone()),
            Sender::Assistant => Message::ai(message.content.clone()),
        }
    }
}

/// Structured metadata attached to a message at creation time.
///
/// Known shapes are tagged by `type`; anything else is kept verbatim as
/// `Opaque` so records written by other clients still load.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageMetadata {
    ToolCalls {
        tool_calls: Vec<ToolCall>,
    },
    ProactiveCheckin {
        time_of_day: TimeOfDay,
        generated_at: DateTime<Utc>,
    },
    Opaque(Value),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedMetadata {
    ToolCalls {
        tool_calls: Vec<ToolCall>,
    },
    ProactiveCheckin {
        time_of_day: TimeOfDay,
        generated_at: DateTime<Utc>,
    },
}

impl Serialize for MessageMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::ToolCalls { tool_calls } => TaggedMetadata::ToolCalls {
                tool_calls: tool_calls.clone(),
            }
            .serialize(serializer),
            Self::ProactiveCheckin { time_of_day, generated_at } => TaggedMetadata::ProactiveCheckin {
                time_of_day: *time_of_day,
                generated_at: *generated_at,
            }
            .serialize(serializer),
            Self::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MessageMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match serde_json::from_value::<TaggedMetadata>(value.clone()) {
            Ok(TaggedMetadata::ToolCalls { tool_calls }) => Self::ToolCalls { tool_calls },
            Ok(TaggedMetadata::ProactiveCheckin { time_of_day, generated_at }) => {
                Self::ProactiveCheckin { time_of_day, generated_at }
            }
            Err(_) => Self::Opaque(value),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Message listing for one thread
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageQuery {
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl MessageQuery {
    /// Most recent `limit` messages, newest first
    pub fn latest(limit: u32) -> Self {
        Self {
            order: SortOrder::Descending,
            limit: Some(limit),
            offset: 0,
        }
    }

    /// Display page, oldest first
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            order: SortOrder::Ascending,
            limit: Some(limit),
            offset,
        }
    }
}
