use std::sync::Arc;

use async_trait::async_trait;
use brock_llm::Tool;
use brock_persist::{GoalQuery, NewGoal, PersistenceClient};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{clamp_limit, non_empty, parse_date};
use crate::handler::{parse_args, to_data, ToolError, ToolHandler, ToolOutput};

const DEFAULT_GOAL_LIMIT: u32 = 10;

pub struct FetchGoalsTool {
    store: Arc<dyn PersistenceClient>,
}

impl FetchGoalsTool {
    pub fn new(store: Arc<dyn PersistenceClient>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FetchGoalsArgs {
    limit: Option<f64>,
}

#[async_trait]
impl ToolHandler for FetchGoalsTool {
    fn name(&self) -> &'static str {
        "fetch_goals"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            self.name(),
            "Fetch all goals from the database",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of goals to fetch",
                        "default": DEFAULT_GOAL_LIMIT
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: FetchGoalsArgs = parse_args(arguments)?;
        let limit = clamp_limit(args.limit, DEFAULT_GOAL_LIMIT);
        let goals = self.store.list_goals(GoalQuery::recent(limit)).await?;
        Ok(ToolOutput::data(to_data(&goals)?))
    }
}

pub struct CreateGoalTool {
    store: Arc<dyn PersistenceClient>,
}

impl CreateGoalTool {
    pub fn new(store: Arc<dyn PersistenceClient>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct CreateGoalArgs {
    name: String,
    milestone_description: String,
    start_date: String,
    milestone_date: String,
    #[serde(default, deserialize_with = "non_empty")]
    reason: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    image_system_name: Option<String>,
}

#[async_trait]
impl ToolHandler for CreateGoalTool {
    fn name(&self) -> &'static str {
        "create_goal"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            self.name(),
            "Create a new goal",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Goal name" },
                    "milestone_description": { "type": "string", "description": "What milestone to achieve" },
                    "start_date": { "type": "string", "description": "Start date (YYYY-MM-DD)" },
                    "milestone_date": { "type": "string", "description": "Target milestone date (YYYY-MM-DD)" },
                    "reason": { "type": "string", "description": "Why this goal matters" },
                    "image_system_name": { "type": "string", "description": "System icon name", "default": "target" }
                },
                "required": ["name", "milestone_description", "start_date", "milestone_date"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: CreateGoalArgs = parse_args(arguments)?;
        if args.name.trim().is_empty() {
            return Err(ToolError::InvalidArguments("name must not be empty".to_string()));
        }

        let start_date = parse_date("start_date", &args.start_date)?;
        let milestone_date = parse_date("milestone_date", &args.milestone_date)?;
        if milestone_date < start_date {
            return Err(ToolError::InvalidArguments(
                "milestone_date must not be before start_date".to_string(),
            ));
        }

        let goal = self
            .store
            .create_goal(NewGoal {
                name: args.name.trim().to_string(),
                milestone_description: args.milestone_description,
                start_date,
                milestone_date,
                reason: args.reason,
                image_system_name: args
                    .image_system_name
                    .unwrap_or_else(|| "target".to_string()),
            })
            .await?;

        let message = format!("Goal \"{}\" created successfully", goal.name);
        Ok(ToolOutput::data(to_data(&goal)?).with_message(message))
    }
}
