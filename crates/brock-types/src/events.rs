use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Observable event of one chat turn, in emission order.
///
/// On the wire each variant becomes one named server-sent event whose data
/// is the variant's fields as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Assistant text delta, forwarded as soon as it arrives
    Message {
        content: String,
    },

    /// A tool call is about to run
    ToolStart {
        name: String,
    },

    /// Tool finished successfully; `result` is the full result payload
    ToolResult {
        name: String,
        result: Value,
    },

    /// Tool failed (unknown name, malformed arguments or execution failure)
    ToolError {
        name: String,
        error: String,
    },

    /// Turn completed
    Done,

    /// Turn aborted
    Error {
        message: String,
    },
}

impl ChatEvent {
    pub fn message(content: impl Into<String>) -> Self {
        Self::Message {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// SSE event name
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::ToolStart { .. } => "tool_start",
            Self::ToolResult { .. } => "tool_result",
            Self::ToolError { .. } => "tool_error",
            Self::Done => "done",
            Self::Error { .. } => "error",
        }
    }

    /// SSE data payload
    pub fn data(&self) -> Value {
        match self {
            Self::Message { content } => json!({ "content": content }),
            Self::ToolStart { name } => json!({ "name": name }),
            Self::ToolResult { name, result } => json!({ "name": name, "result": result }),
            Self::ToolError { name, error } => json!({ "name": name, "error": error }),
            Self::Done => json!({}),
            Self::Error { message } => json!({ "message": message }),
        }
    }

    /// Whether this event closes the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let events = [
            (ChatEvent::message("hi"), "message"),
            (ChatEvent::ToolStart { name: "fetch_goals".into() }, "tool_start"),
            (ChatEvent::ToolResult { name: "fetch_goals".into(), result: json!({}) }, "tool_result"),
            (ChatEvent::ToolError { name: "x".into(), error: "boom".into() }, "tool_error"),
            (ChatEvent::Done, "done"),
            (ChatEvent::error("bad"), "error"),
        ];
        for (event, name) in events {
            assert_eq!(event.event_name(), name);
        }
    }

    #[test]
    fn test_data_payloads() {
        assert_eq!(ChatEvent::Done.data(), json!({}));
        assert_eq!(ChatEvent::error("upstream").data(), json!({"message": "upstream"}));
        assert_eq!(
            ChatEvent::ToolResult {
                name: "fetch_goals".into(),
                result: json!({"success": true, "data": []}),
            }
            .data(),
            json!({"name": "fetch_goals", "result": {"success": true, "data": []}})
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(ChatEvent::Done.is_terminal());
        assert!(ChatEvent::error("x").is_terminal());
        assert!(!ChatEvent::message("x").is_terminal());
    }
}
