//! Scripted [`ChatClient`] for exercising consumers without a network.
//!
//! Streams and one-shot replies are queued up front and handed out in order.
//! Every request is recorded so tests can assert on what was sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::streaming::StreamEvent;
use crate::traits::{ChatClient, ChatRequest, ChatResponse, EventStream};

/// Which trait method produced a recorded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Chat,
    Stream,
}

enum ScriptedStream {
    Events(Vec<Result<StreamEvent, String>>),
    OpenFailure(String),
}

#[derive(Default)]
pub struct ScriptedChatClient {
    streams: Mutex<VecDeque<ScriptedStream>>,
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<(CallKind, ChatRequest)>>,
}

impl ScriptedChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stream that yields the given events
    pub fn push_stream(self, events: Vec<StreamEvent>) -> Self {
        self.queue_stream(ScriptedStream::Events(events.into_iter().map(Ok).collect()))
    }

    /// Queue a stream that yields the events, then a transport error
    pub fn push_stream_then_error(self, events: Vec<StreamEvent>, error: impl Into<String>) -> Self {
        let mut items: Vec<Result<StreamEvent, String>> = events.into_iter().map(Ok).collect();
        items.push(Err(error.into()));
        self.queue_stream(ScriptedStream::Events(items))
    }

    /// Queue a stream request that fails before any event
    pub fn push_stream_failure(self, error: impl Into<String>) -> Self {
        self.queue_stream(ScriptedStream::OpenFailure(error.into()))
    }

    /// Queue a one-shot reply
    pub fn push_reply(self, content: impl Into<String>) -> Self {
        self.lock_replies().push_back(Ok(content.into()));
        self
    }

    /// Queue a one-shot failure
    pub fn push_reply_failure(self, error: impl Into<String>) -> Self {
        self.lock_replies().push_back(Err(error.into()));
        self
    }

    pub fn requests(&self) -> Vec<(CallKind, ChatRequest)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn requests_of(&self, kind: CallKind) -> Vec<ChatRequest> {
        self.requests()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r)
            .collect()
    }

    fn queue_stream(self, stream: ScriptedStream) -> Self {
        if let Ok(mut streams) = self.streams.lock() {
            streams.push_back(stream);
        }
        self
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        match self.replies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, kind: CallKind, request: ChatRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((kind, request));
        }
    }
}

/// Text delta
pub fn text(content: &str) -> StreamEvent {
    StreamEvent::Message {
        content: content.to_string(),
    }
}

/// Complete tool-call fragment
pub fn tool_call(index: u32, id: &str, name: &str, arguments: &str) -> StreamEvent {
    StreamEvent::ToolCall {
        index,
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        arguments: Some(arguments.to_string()),
    }
}

/// Arguments-only fragment
pub fn tool_args(index: u32, arguments: &str) -> StreamEvent {
    StreamEvent::ToolCall {
        index,
        id: None,
        name: None,
        arguments: Some(arguments.to_string()),
    }
}

pub fn finish(reason: &str) -> StreamEvent {
    StreamEvent::Done {
        finish_reason: Some(reason.to_string()),
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.record(CallKind::Chat, request);
        match self.lock_replies().pop_front() {
            Some(Ok(content)) => Ok(ChatResponse {
                content: Some(content),
                finish_reason: Some("stop".to_string()),
                ..Default::default()
            }),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => anyhow::bail!("no scripted reply left"),
        }
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        self.record(CallKind::Stream, request);
        let next = self.streams.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(ScriptedStream::Events(items)) => {
                let items: Vec<Result<StreamEvent>> = items
                    .into_iter()
                    .map(|item| item.map_err(|e| anyhow::anyhow!(e)))
                    .collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Some(ScriptedStream::OpenFailure(e)) => Err(anyhow::anyhow!(e)),
            None => anyhow::bail!("no scripted stream left"),
        }
    }
}
