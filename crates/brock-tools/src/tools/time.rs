use std::sync::Arc;

use async_trait::async_trait;
use brock_llm::Tool;
use chrono::FixedOffset;
use serde_json::{json, Value};

use crate::clock::Clock;
use crate::handler::{ToolError, ToolHandler, ToolOutput};

/// Reports the current instant in the user's local offset
pub struct GetCurrentTimeTool {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    timezone: String,
}

impl GetCurrentTimeTool {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset, timezone: impl Into<String>) -> Self {
        Self {
            clock,
            offset,
            timezone: timezone.into(),
        }
    }
}

#[async_trait]
impl ToolHandler for GetCurrentTimeTool {
    fn name(&self) -> &'static str {
        "get_current_time"
    }

    fn definition(&self) -> Tool {
        Tool::new(
            self.name(),
            "Get the current date and time",
            json!({ "type": "object", "properties": {} }),
        )
    }

    // Takes no arguments; whatever the model sends is ignored
    async fn call(&self, _arguments: Value) -> Result<ToolOutput, ToolError> {
        let now = self.clock.now();
        let local = now.with_timezone(&self.offset);
        Ok(ToolOutput::data(json!({
            "iso": now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "date": local.format("%Y-%m-%d").to_string(),
            "time": local.format("%H:%M:%S").to_string(),
            "timezone": self.timezone,
        })))
    }
}
