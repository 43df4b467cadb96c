use async_trait::async_trait;
use brock_llm::Tool;
use brock_persist::PersistError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Store(#[from] PersistError),
}

/// Successful tool output before it is wrapped into a result
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub data: Value,
    pub message: Option<String>,
}

impl ToolOutput {
    pub fn data(data: Value) -> Self {
        Self { data, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A callable tool: schema and behaviour in one place
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Function name the model calls
    fn name(&self) -> &'static str;

    /// Schema advertised to the model
    fn definition(&self) -> Tool;

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError>;
}

/// Deserialize tool arguments, mapping shape errors to `InvalidArguments`
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Serialize store records into result data
pub fn to_data<T: serde::Serialize>(records: &T) -> Result<Value, ToolError> {
    serde_json::to_value(records).map_err(|e| ToolError::Store(PersistError::Serialization(e)))
}
