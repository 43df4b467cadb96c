use std::sync::Arc;

use async_trait::async_trait;
use brock_llm::Tool;
use brock_persist::{ActivityQuery, NewActivity, PersistenceClient};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{clamp_limit, non_empty};
use crate::handler::{parse_args, to_data, ToolError, ToolHandler, ToolOutput};

const DEFAULT_ACTIVITY_LIMIT: u32 = 20;

pub struct FetchActivitiesTool {
    store: Arc<dyn PersistenceClient>,
}

impl FetchActivitiesTool {
    pub fn new(store: Arc<dyn PersistenceClient>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FetchActivitiesArgs {
    #[serde(default, deserialize_with = "non_empty")]
    goal_id: Option<String>,
    limit: Option<f64>,
    #[serde(default, deserialize_with = "non_empty")]
    activity_type: Option<String>,
}

#[async_trait]
impl ToolHandler for FetchActivitiesTool {
    fn name(&self) -> &'static str {
        "fetch_activities"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            self.name(),
            "Fetch activities, optionally filtered by goal",
            json!({
                "type": "object",
                "properties": {
                    "goal_id": { "type": "string", "description": "Filter by specific goal ID" },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of activities to fetch",
                        "default": DEFAULT_ACTIVITY_LIMIT
                    },
                    "activity_type": {
                        "type": "string",
                        "description": "Filter by activity type (workout, nutrition, etc.)"
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: FetchActivitiesArgs = parse_args(arguments)?;
        let query = ActivityQuery {
            goal_id: args.goal_id,
            activity_type: args.activity_type,
            limit: clamp_limit(args.limit, DEFAULT_ACTIVITY_LIMIT),
        };
        let activities = self.store.list_activities(query).await?;
        Ok(ToolOutput::data(to_data(&activities)?))
    }
}

pub struct LogActivityTool {
    store: Arc<dyn PersistenceClient>,
}

impl LogActivityTool {
    pub fn new(store: Arc<dyn PersistenceClient>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct LogActivityArgs {
    title: String,
    icon_name: String,
    #[serde(default, deserialize_with = "non_empty")]
    goal_id: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    activity_type: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[async_trait]
impl ToolHandler for LogActivityTool {
    fn name(&self) -> &'static str {
        "log_activity"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            self.name(),
            "Log a new activity",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Activity title" },
                    "icon_name": { "type": "string", "description": "System icon name" },
                    "goal_id": { "type": "string", "description": "Related goal ID (optional)" },
                    "activity_type": { "type": "string", "description": "Type of activity", "default": "general" },
                    "data": {
                        "type": "object",
                        "description": "Additional activity data (sets, reps, distance, etc.)"
                    }
                },
                "required": ["title", "icon_name"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: LogActivityArgs = parse_args(arguments)?;
        let data = match args.data {
            None | Some(Value::Null) => json!({}),
            Some(obj @ Value::Object(_)) => obj,
            Some(_) => {
                return Err(ToolError::InvalidArguments("data must be an object".to_string()))
            }
        };

        let activity = self
            .store
            .create_activity(NewActivity {
                title: args.title,
                icon_name: args.icon_name,
                goal_id: args.goal_id,
                activity_type: args.activity_type.unwrap_or_else(|| "general".to_string()),
                data,
            })
            .await?;

        let message = format!("Activity \"{}\" logged successfully", activity.title);
        Ok(ToolOutput::data(to_data(&activity)?).with_message(message))
    }
}
