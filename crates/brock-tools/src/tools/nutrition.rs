use std::sync::Arc;

use async_trait::async_trait;
use brock_llm::Tool;
use brock_persist::{NutritionQuery, PersistenceClient};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{clamp_limit, non_empty, parse_date};
use crate::handler::{parse_args, to_data, ToolError, ToolHandler, ToolOutput};

const DEFAULT_DAYS: u32 = 7;

pub struct FetchDailyNutritionTool {
    store: Arc<dyn PersistenceClient>,
}

impl FetchDailyNutritionTool {
    pub fn new(store: Arc<dyn PersistenceClient>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FetchNutritionArgs {
    #[serde(default, deserialize_with = "non_empty")]
    date: Option<String>,
    limit: Option<f64>,
}

#[async_trait]
impl ToolHandler for FetchDailyNutritionTool {
    fn name(&self) -> &'static str {
        "fetch_daily_nutrition"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            self.name(),
            "Fetch daily nutrition data",
            json!({
                "type": "object",
                "properties": {
                    "date": {
                        "type": "string",
                        "description": "Specific date (YYYY-MM-DD) or leave empty for recent days"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Number of days to fetch",
                        "default": DEFAULT_DAYS
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: FetchNutritionArgs = parse_args(arguments)?;
        // A specific date wins over the recency window
        let query = match args.date {
            Some(date) => NutritionQuery::Day(parse_date("date", &date)?),
            None => NutritionQuery::Recent {
                limit: clamp_limit(args.limit, DEFAULT_DAYS),
            },
        };
        let days = self.store.list_daily_nutrition(query).await?;
        Ok(ToolOutput::data(to_data(&days)?))
    }
}
