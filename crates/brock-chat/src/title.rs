use std::sync::Arc;

use brock_llm::{ChatClient, ChatRequest, Message};
use brock_types::LLMConfig;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::templates::TITLE_PROMPT_TEMPLATE;

/// Names a thread from its first user message
pub struct TitleGenerator {
    llm: Arc<dyn ChatClient>,
    config: LLMConfig,
}

impl TitleGenerator {
    pub fn new(llm: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self { llm, config }
    }

    /// One attempt, no retries. Fails on model errors and blank titles.
    pub async fn generate(&self, first_message: &str) -> Result<String> {
        let prompt = TITLE_PROMPT_TEMPLATE.replace("<user_message>", first_message);
        let request = ChatRequest::new(self.config.model.clone(), vec![Message::human(prompt)])
            .with_options(self.config.options());

        let response = self.llm.chat(request).await?;
        let title = clean_title(response.content.as_deref().unwrap_or_default());
        if title.is_empty() {
            return Err(ChatError::EmptyOutput("title"));
        }

        debug!(title = %title, "Generated thread title");
        Ok(title)
    }
}

/// Trim, then drop quote characters wrapping the title
fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
