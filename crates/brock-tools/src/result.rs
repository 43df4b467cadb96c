use serde::{Serialize, Serializer};
use serde_json::Value;

/// Outcome of one tool invocation, as fed back to the model:
/// `{"success": true, "data": ..., "message"?: ...}` or
/// `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success {
        data: Value,
        message: Option<String>,
    },
    Failure {
        error: String,
    },
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        Self::Success { data, message: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure { error: error.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Success { data, message: Some(message) } => {
                serde_json::json!({ "success": true, "data": data, "message": message })
            }
            Self::Success { data, message: None } => {
                serde_json::json!({ "success": true, "data": data })
            }
            Self::Failure { error } => serde_json::json!({ "success": false, "error": error }),
        }
    }

    /// Serialized payload for a tool-result turn
    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let result = ToolResult::Success {
            data: json!({"id": "g1"}),
            message: Some("Goal \"5k\" created successfully".to_string()),
        };
        assert_eq!(
            result.to_value(),
            json!({"success": true, "data": {"id": "g1"}, "message": "Goal \"5k\" created successfully"})
        );
    }

    #[test]
    fn test_message_omitted_when_absent() {
        let value = ToolResult::success(json!([])).to_value();
        assert!(value.get("message").is_none());
        assert_eq!(value["data"], json!([]));
    }

    #[test]
    fn test_failure_shape() {
        let result = ToolResult::failure("Unknown tool: lift_weights");
        assert_eq!(result.error(), Some("Unknown tool: lift_weights"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "error": "Unknown tool: lift_weights"})
        );
    }
}
