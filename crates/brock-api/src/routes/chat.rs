use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;

use brock_types::ChatEvent;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub user_message: String,
}

/// Run one chat turn and stream its events as Server-Sent Events
///
/// Missing fields are rejected with 400 before the stream opens. Once open,
/// the stream always ends with `done` or `error`.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let receiver = state
        .orchestrator
        .spawn_turn(&req.thread_id, &req.user_message)?;

    let sse_stream = ReceiverStream::new(receiver).map(|event| Ok(to_sse_event(&event)));

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &ChatEvent) -> Event {
    let name = event.event_name();
    // Serializing a `Value` cannot fail
    Event::default()
        .event(name)
        .json_data(event.data())
        .unwrap_or_else(|_| Event::default().event(name).data("{}"))
}
