use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, warn};

use brock_llm::{ChatClient, ChatRequest, Message};
use brock_persist::{DBMessage, MessageQuery, PersistenceClient, ThreadUpdate};
use brock_types::LLMConfig;

use crate::profile::Profile;
use crate::templates::{
    SUMMARY_EMPTY_THREAD, SUMMARY_FALLBACK, SUMMARY_SYSTEM_PROMPT, UNKNOWN_THREAD_TITLE,
};

/// Messages fed to the summary model
const SUMMARY_WINDOW: u32 = 20;

/// Snapshot of a thread for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadContext {
    pub thread_id: String,
    pub title: String,
    pub topic: Option<String>,
    pub summary: Option<String>,
    /// Oldest first
    pub recent_messages: Vec<DBMessage>,
}

impl ThreadContext {
    /// Context of a thread that could not be loaded
    pub fn unknown(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            title: UNKNOWN_THREAD_TITLE.to_string(),
            topic: None,
            summary: None,
            recent_messages: Vec::new(),
        }
    }
}

/// Gathers profile and thread state for prompting and maintains thread
/// summaries.
pub struct ContextAssembler {
    store: Arc<dyn PersistenceClient>,
    llm: Arc<dyn ChatClient>,
    profile: Profile,
    summary_llm: LLMConfig,
}

impl ContextAssembler {
    pub fn new(
        store: Arc<dyn PersistenceClient>,
        llm: Arc<dyn ChatClient>,
        profile: Profile,
        summary_llm: LLMConfig,
    ) -> Self {
        Self {
            store,
            llm,
            profile,
            summary_llm,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Load the thread and its latest `message_limit` messages.
    ///
    /// Never fails: a missing thread or a store error yields
    /// [`ThreadContext::unknown`].
    pub async fn thread_context(&self, thread_id: &str, message_limit: usize) -> ThreadContext {
        match self.load_thread_context(thread_id, message_limit).await {
            Ok(Some(context)) => context,
            Ok(None) => {
                warn!(thread_id = %thread_id, "Thread not found, using empty context");
                ThreadContext::unknown(thread_id)
            }
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "Failed to load thread context");
                ThreadContext::unknown(thread_id)
            }
        }
    }

    async fn load_thread_context(
        &self,
        thread_id: &str,
        message_limit: usize,
    ) -> Result<Option<ThreadContext>> {
        let limit = u32::try_from(message_limit).unwrap_or(u32::MAX);
        let (thread, mut messages) = tokio::try_join!(
            self.store.get_thread(thread_id),
            self.store.list_messages(thread_id, MessageQuery::latest(limit)),
        )?;

        let Some(thread) = thread else {
            return Ok(None);
        };

        // Fetched newest first
        messages.reverse();
        debug!(thread_id = %thread_id, messages = messages.len(), "Loaded thread context");

        Ok(Some(ThreadContext {
            thread_id: thread.id,
            title: thread.title,
            topic: thread.topic,
            summary: thread.summary,
            recent_messages: messages,
        }))
    }

    /// Stored messages as model turns, oldest first
    pub fn history_messages(&self, context: &ThreadContext) -> Vec<Message> {
        context.recent_messages.iter().map(Message::from).collect()
    }

    /// One or two sentence synopsis of the thread's latest messages.
    ///
    /// Returns [`SUMMARY_EMPTY_THREAD`] for a thread without messages and
    /// [`SUMMARY_FALLBACK`] when anything goes wrong.
    pub async fn generate_thread_summary(&self, thread_id: &str) -> String {
        match self.try_generate_summary(thread_id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "Summary generation failed, using fallback");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    async fn try_generate_summary(&self, thread_id: &str) -> Result<String> {
        let mut messages = self
            .store
            .list_messages(thread_id, MessageQuery::latest(SUMMARY_WINDOW))
            .await?;
        if messages.is_empty() {
            return Ok(SUMMARY_EMPTY_THREAD.to_string());
        }
        messages.reverse();

        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.sender.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let request = ChatRequest::new(
            self.summary_llm.model.clone(),
            vec![Message::system(SUMMARY_SYSTEM_PROMPT), Message::human(transcript)],
        )
        .with_options(self.summary_llm.options());

        let response = self.llm.chat(request).await?;
        Ok(response.text().unwrap_or(SUMMARY_FALLBACK).to_string())
    }

    /// Generate a summary and store it on the thread. Failures are logged.
    pub async fn refresh_thread_summary(&self, thread_id: &str) {
        let summary = self.generate_thread_summary(thread_id).await;
        if let Err(e) = self
            .store
            .update_thread(thread_id, ThreadUpdate::summary(summary))
            .await
        {
            error!(thread_id = %thread_id, error = %e, "Failed to store thread summary");
        }
    }
}
