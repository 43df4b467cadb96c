use brock_llm::ChatOptions;
use serde::{Deserialize, Serialize};

/// Model and sampling settings for one kind of call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Conversational turns
    pub fn chat() -> Self {
        Self::new("gpt-4o").with_temperature(0.7).with_max_tokens(1000)
    }

    /// Thread titles (2-4 words)
    pub fn title() -> Self {
        Self::new("gpt-4o").with_temperature(0.2).with_max_tokens(15)
    }

    /// Thread synopses
    pub fn summary() -> Self {
        Self::new("gpt-4o-mini").with_temperature(0.3).with_max_tokens(100)
    }

    /// Proactive check-ins
    pub fn proactive() -> Self {
        Self::new("gpt-4o").with_temperature(0.8).with_max_tokens(200)
    }

    /// Sampling options for a request with this config
    pub fn options(&self) -> ChatOptions {
        let mut options = ChatOptions::new();
        if let Some(temp) = self.temperature {
            options = options.temperature(temp);
        }
        if let Some(tokens) = self.max_tokens {
            options = options.max_tokens(tokens);
        }
        options
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::chat()
    }
}

/// Settings for one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub llm: LLMConfig,
    pub title_llm: LLMConfig,
    /// Prior messages included in the prompt
    pub history_limit: usize,
    /// Capacity of the per-turn event channel
    pub event_buffer: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::chat(),
            title_llm: LLMConfig::title(),
            history_limit: 10,
            event_buffer: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProactiveConfig {
    pub llm: LLMConfig,
    pub activity_limit: u32,
    pub goal_limit: u32,
}

impl Default for ProactiveConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::proactive(),
            activity_limit: 5,
            goal_limit: 3,
        }
    }
}
