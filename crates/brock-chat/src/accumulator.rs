use std::collections::BTreeMap;

use brock_llm::{StreamEvent, ToolCall};
use serde_json::Value;

/// Name echoed back for a call the model sent without one; the API rejects
/// empty function names
pub const UNKNOWN_TOOL_NAME: &str = "unknown_tool";

/// Fragments received so far for one tool call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialToolCall {
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: String,
}

impl PartialToolCall {
    /// Later ids and names win; argument text is appended.
    fn merge(&mut self, id: Option<String>, name: Option<String>, arguments: Option<String>) {
        if let Some(id) = id.filter(|s| !s.is_empty()) {
            self.id = Some(id);
        }
        if let Some(name) = name.filter(|s| !s.is_empty()) {
            self.name = Some(name);
        }
        if let Some(arguments) = arguments {
            self.arguments.push_str(&arguments);
        }
    }
}

/// A call ready to dispatch, or one the model got wrong
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedCall {
    Ready {
        call: ToolCall,
        arguments: Value,
    },
    /// Missing name or unparseable arguments; `call` is what gets echoed
    /// back to the model
    Malformed {
        call: ToolCall,
        reason: String,
    },
}

impl ResolvedCall {
    pub fn call(&self) -> &ToolCall {
        match self {
            Self::Ready { call, .. } | Self::Malformed { call, .. } => call,
        }
    }
}

/// Tool-call fragments keyed by stream index
#[derive(Debug, Clone, Default)]
pub struct ToolCallTable {
    calls: BTreeMap<u32, PartialToolCall>,
}

impl ToolCallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one stream event in. Returns false for events that are not tool
    /// call fragments.
    pub fn observe(&mut self, event: &StreamEvent) -> bool {
        match event {
            StreamEvent::ToolCall { index, id, name, arguments } => {
                self.merge(*index, id.clone(), name.clone(), arguments.clone());
                true
            }
            _ => false,
        }
    }

    pub fn merge(
        &mut self,
        index: u32,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    ) {
        self.calls.entry(index).or_default().merge(id, name, arguments);
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn get(&self, index: u32) -> Option<&PartialToolCall> {
        self.calls.get(&index)
    }

    /// Finalize every call in index order.
    ///
    /// A call is ready when it has a name and its arguments parse as JSON.
    /// Empty argument text does not parse.
    pub fn resolve(self) -> Vec<ResolvedCall> {
        self.calls
            .into_iter()
            .map(|(index, partial)| {
                let id = partial.id.unwrap_or_else(|| format!("call_{}", index));
                let Some(name) = partial.name else {
                    return ResolvedCall::Malformed {
                        call: ToolCall::new(id, UNKNOWN_TOOL_NAME, partial.arguments),
                        reason: format!("Tool call at index {} has no function name", index),
                    };
                };
                match serde_json::from_str::<Value>(&partial.arguments) {
                    Ok(arguments) => ResolvedCall::Ready {
                        call: ToolCall::new(id, name, partial.arguments),
                        arguments,
                    },
                    Err(e) => ResolvedCall::Malformed {
                        reason: format!("Invalid arguments for {}: {}", name, e),
                        call: ToolCall::new(id, name, partial.arguments),
                    },
                }
            })
            .collect()
    }
}
