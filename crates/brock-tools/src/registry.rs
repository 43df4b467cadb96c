use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use brock_llm::Tool;
use brock_persist::PersistenceClient;
use chrono::FixedOffset;
use serde_json::Value;

use crate::clock::Clock;
use crate::handler::ToolHandler;
use crate::result::ToolResult;
use crate::tools::{
    CreateGoalTool, FetchActivitiesTool, FetchDailyNutritionTool, FetchGoalsTool,
    GetCurrentTimeTool, LogActivityTool,
};

/// Fixed mapping from tool name to handler
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The coaching tool set backed by `store`
    pub fn with_default_tools(
        store: Arc<dyn PersistenceClient>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
        timezone: impl Into<String>,
    ) -> Self {
        Self::new()
            .register(FetchGoalsTool::new(store.clone()))
            .register(CreateGoalTool::new(store.clone()))
            .register(FetchActivitiesTool::new(store.clone()))
            .register(LogActivityTool::new(store.clone()))
            .register(FetchDailyNutritionTool::new(store))
            .register(GetCurrentTimeTool::new(clock, offset, timezone))
    }

    /// Add a handler; a later handler with the same name replaces the earlier one
    pub fn register(mut self, handler: impl ToolHandler + 'static) -> Self {
        let name = handler.name();
        let handler: Arc<dyn ToolHandler> = Arc::new(handler);
        match self.index.get(name) {
            Some(&pos) => self.handlers[pos] = handler,
            None => {
                self.index.insert(name, self.handlers.len());
                self.handlers.push(handler);
            }
        }
        self
    }

    /// Schemas in registration order
    pub fn definitions(&self) -> Vec<Tool> {
        self.handlers.iter().map(|h| h.definition()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run one tool. Never fails: errors come back as `ToolResult::Failure`.
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult {
        let Some(handler) = self.index.get(name).map(|&pos| &self.handlers[pos]) else {
            tracing::warn!(tool = name, "unknown tool requested");
            return ToolResult::failure(format!("Unknown tool: {}", name));
        };

        let start = Instant::now();
        let outcome = handler.call(arguments).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                tracing::info!(tool = name, duration_ms, "tool succeeded");
                ToolResult::Success {
                    data: output.data,
                    message: output.message,
                }
            }
            Err(e) => {
                tracing::warn!(tool = name, duration_ms, error = %e, "tool failed");
                ToolResult::failure(e.to_string())
            }
        }
    }
}
