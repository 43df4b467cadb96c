use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use brock_context::{build_system_prompt, ContextAssembler};
use brock_llm::{ChatClient, ChatOptions, ChatRequest, Message, StreamEvent, ToolCall, ToolChoice};
use brock_persist::{DBMessage, MessageMetadata, PersistenceClient, ThreadUpdate};
use brock_tools::{ToolRegistry, ToolResult};
use brock_types::{ChatConfig, ChatEvent};

use crate::accumulator::{ResolvedCall, ToolCallTable};
use crate::error::{ChatError, Result};
use crate::title::TitleGenerator;

/// Sent to the client on failure; details stay in the logs
pub const STREAM_ERROR_MESSAGE: &str = "An error occurred during streaming";

/// Phase of a running turn, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Init,
    ContextLoaded,
    StreamingPrimary,
    ToolDispatch,
    StreamingFollowup,
    Persisting,
    Done,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::ContextLoaded => "context_loaded",
            Self::StreamingPrimary => "streaming_primary",
            Self::ToolDispatch => "tool_dispatch",
            Self::StreamingFollowup => "streaming_followup",
            Self::Persisting => "persisting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs chat turns: context, streaming completion, tool dispatch,
/// follow-up completion and persistence.
#[derive(Clone)]
pub struct ChatOrchestrator {
    llm: Arc<dyn ChatClient>,
    store: Arc<dyn PersistenceClient>,
    tools: Arc<ToolRegistry>,
    context: Arc<ContextAssembler>,
    titles: Arc<TitleGenerator>,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(
        llm: Arc<dyn ChatClient>,
        store: Arc<dyn PersistenceClient>,
        tools: Arc<ToolRegistry>,
        context: Arc<ContextAssembler>,
        config: ChatConfig,
    ) -> Self {
        let titles = Arc::new(TitleGenerator::new(llm.clone(), config.title_llm.clone()));
        Self {
            llm,
            store,
            tools,
            context,
            titles,
            config,
        }
    }

    /// Validate the input and start the turn in the background.
    ///
    /// Invalid input is rejected here, before anything is stored. Otherwise
    /// the returned receiver yields the turn's events and always ends with
    /// `Done` or `Error`. Dropping the receiver aborts the turn.
    pub fn spawn_turn(
        &self,
        thread_id: &str,
        user_message: &str,
    ) -> Result<mpsc::Receiver<ChatEvent>> {
        let user_message = user_message.trim();
        if user_message.is_empty() {
            return Err(ChatError::Validation("User message is required".to_string()));
        }
        let thread_id = thread_id.trim();
        if thread_id.is_empty() {
            return Err(ChatError::Validation("Thread ID is required".to_string()));
        }

        let (tx, rx) = mpsc::channel(self.config.event_buffer.max(1));
        let turn = Turn {
            orchestrator: self.clone(),
            thread_id: thread_id.to_string(),
            user_message: user_message.to_string(),
            tx,
            state: TurnState::Init,
        };

        tokio::spawn(turn.run());

        Ok(rx)
    }
}

/// Text and tool calls collected from one streamed completion
#[derive(Default)]
struct Completion {
    text: String,
    calls: ToolCallTable,
    finish_reason: Option<String>,
}

impl Completion {
    fn wants_tools(&self) -> bool {
        self.finish_reason.as_deref() == Some("tool_calls") && !self.calls.is_empty()
    }
}

struct Turn {
    orchestrator: ChatOrchestrator,
    thread_id: String,
    user_message: String,
    tx: mpsc::Sender<ChatEvent>,
    state: TurnState,
}

impl Turn {
    async fn run(mut self) {
        let start = Instant::now();
        let thread_id = self.thread_id.clone();
        let tx = self.tx.clone();

        match self.execute().await {
            Ok(()) => {
                info!(
                    thread_id = %thread_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Chat turn completed"
                );
            }
            Err(ChatError::Disconnected) => {
                info!(thread_id = %thread_id, "Client disconnected, chat turn aborted");
            }
            Err(e) => {
                error!(thread_id = %thread_id, error = %e, "Chat turn failed");
                let _ = tx.send(ChatEvent::error(STREAM_ERROR_MESSAGE)).await;
            }
        }
    }

    fn transition(&mut self, next: TurnState) {
        debug!(thread_id = %self.thread_id, from = %self.state, to = %next, "Turn state");
        self.state = next;
    }

    async fn emit(&self, event: ChatEvent) -> Result<()> {
        self.tx.send(event).await.map_err(|_| ChatError::Disconnected)
    }

    async fn execute(&mut self) -> Result<()> {
        let o = self.orchestrator.clone();

        let (context, has_messages) = tokio::join!(
            o.context.thread_context(&self.thread_id, o.config.history_limit),
            o.store.has_messages(&self.thread_id),
        );
        let is_first_message = !has_messages?;
        self.transition(TurnState::ContextLoaded);

        // Write-ahead: the user turn is stored before any model call
        o.store
            .save_message(DBMessage::user(&self.thread_id, &self.user_message))
            .await?;

        let mut messages = vec![Message::system(build_system_prompt(o.context.profile(), &context))];
        messages.extend(o.context.history_messages(&context));
        messages.push(Message::human(self.user_message.clone()));

        self.transition(TurnState::StreamingPrimary);
        let options = o
            .config
            .llm
            .options()
            .tools(o.tools.definitions())
            .tool_choice(ToolChoice::auto());
        let primary = self.stream_completion(messages.clone(), options, true).await?;

        let mut text = primary.text.clone();
        let mut tool_calls = None;

        if primary.wants_tools() {
            self.transition(TurnState::ToolDispatch);
            let (echoed, tool_turns) = self.dispatch(primary.calls).await?;

            messages.push(Message::ai_with_tools(Some(primary.text), echoed.clone()));
            messages.extend(tool_turns);

            // Depth 1: the follow-up gets no tools
            self.transition(TurnState::StreamingFollowup);
            let followup = self
                .stream_completion(messages, o.config.llm.options(), false)
                .await?;
            text.push_str(&followup.text);
            tool_calls = Some(echoed);
        }

        self.transition(TurnState::Persisting);
        self.persist(text.trim(), tool_calls, is_first_message).await?;

        self.transition(TurnState::Done);
        self.emit(ChatEvent::Done).await
    }

    /// Stream one completion, forwarding text deltas as they arrive.
    /// Tool-call fragments are collected only when `collect_tools` is set.
    async fn stream_completion(
        &self,
        messages: Vec<Message>,
        options: ChatOptions,
        collect_tools: bool,
    ) -> Result<Completion> {
        let o = &self.orchestrator;
        let request = ChatRequest::new(o.config.llm.model.clone(), messages).with_options(options);
        let mut stream = o.llm.chat_stream(request).await?;
        let mut completion = Completion::default();

        loop {
            let next = tokio::select! {
                _ = self.tx.closed() => return Err(ChatError::Disconnected),
                next = stream.next() => next,
            };
            let Some(event) = next else { break };

            match event? {
                StreamEvent::Message { content } => {
                    completion.text.push_str(&content);
                    self.emit(ChatEvent::message(content)).await?;
                }
                event @ StreamEvent::ToolCall { .. } => {
                    if collect_tools {
                        completion.calls.observe(&event);
                    } else {
                        debug!(thread_id = %self.thread_id, "Ignoring tool call in follow-up");
                    }
                }
                // A bare `[DONE]` follows the chunk that carries the reason
                StreamEvent::Done { finish_reason } => {
                    if finish_reason.is_some() {
                        completion.finish_reason = finish_reason;
                    }
                }
            }
        }

        Ok(completion)
    }

    /// Run every call in index order. Returns the calls to echo back and one
    /// tool turn per call.
    async fn dispatch(&self, calls: ToolCallTable) -> Result<(Vec<ToolCall>, Vec<Message>)> {
        let resolved = calls.resolve();
        let mut echoed = Vec::with_capacity(resolved.len());
        let mut tool_turns = Vec::with_capacity(resolved.len());

        for entry in resolved {
            let name = entry.call().function.name.clone();
            self.emit(ChatEvent::ToolStart { name: name.clone() }).await?;

            let (call, result) = match entry {
                ResolvedCall::Ready { call, arguments } => {
                    let result = self.orchestrator.tools.execute(&name, arguments).await;
                    (call, result)
                }
                ResolvedCall::Malformed { call, reason } => {
                    warn!(thread_id = %self.thread_id, reason = %reason, "Malformed tool call");
                    (call, ToolResult::failure(reason))
                }
            };

            let event = match result.error() {
                None => ChatEvent::ToolResult {
                    name,
                    result: result.to_value(),
                },
                Some(error) => ChatEvent::ToolError {
                    name,
                    error: error.to_string(),
                },
            };
            self.emit(event).await?;

            tool_turns.push(Message::tool_result(call.id.clone(), result.to_json_string()));
            echoed.push(call);
        }

        Ok((echoed, tool_turns))
    }

    async fn persist(
        &self,
        text: &str,
        tool_calls: Option<Vec<ToolCall>>,
        is_first_message: bool,
    ) -> Result<()> {
        let o = &self.orchestrator;

        // An empty reply leaves the thread untouched and untitled
        if text.is_empty() {
            return Ok(());
        }

        let mut message = DBMessage::assistant(&self.thread_id, text);
        if let Some(tool_calls) = tool_calls {
            message = message.with_metadata(MessageMetadata::ToolCalls { tool_calls });
        }
        o.store.save_message(message).await?;

        if is_first_message {
            match o.titles.generate(&self.user_message).await {
                Ok(title) => {
                    let updated = o
                        .store
                        .update_thread(&self.thread_id, ThreadUpdate::title(title))
                        .await;
                    return self.tolerate_missing_thread(updated.map(|_| ()));
                }
                Err(e) => {
                    warn!(thread_id = %self.thread_id, error = %e, "Title generation failed");
                }
            }
        }

        let touched = o.store.touch_thread(&self.thread_id).await;
        self.tolerate_missing_thread(touched)
    }

    /// Messages may target a thread row that does not exist; updating it
    /// is then a no-op rather than a failed turn.
    fn tolerate_missing_thread(&self, result: brock_persist::Result<()>) -> Result<()> {
        match result {
            Err(e) if e.is_not_found() => {
                warn!(thread_id = %self.thread_id, "Thread not found, skipping update");
                Ok(())
            }
            other => Ok(other?),
        }
    }
}
