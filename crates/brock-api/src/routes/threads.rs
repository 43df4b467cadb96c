use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use brock_chat::{
    find_general_checkin_thread, find_or_create_general_checkin_thread, update_thread_flags,
    FlagMode,
};
use brock_persist::{DBMessage, MessageQuery, NewThread, Thread, ThreadFlags};

use super::{success, success_with_message, Envelope};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_THREAD_LIMIT: u32 = 50;
const MAX_THREAD_LIMIT: u32 = 100;
const DEFAULT_MESSAGE_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    pub limit: Option<u32>,
}

/// Threads, most recently updated first
pub async fn list_threads(
    State(state): State<AppState>,
    Query(query): Query<ListThreadsQuery>,
) -> ApiResult<Json<Envelope<Vec<Thread>>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_THREAD_LIMIT)
        .clamp(1, MAX_THREAD_LIMIT);
    let threads = state.store.list_threads(Some(limit)).await?;
    Ok(success(threads))
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub flags: ThreadFlags,
}

pub async fn create_thread(
    State(state): State<AppState>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Thread>>)> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let thread = state
        .store
        .create_thread(NewThread {
            title: title.to_string(),
            topic: req.topic,
            summary: req.summary,
            flags: req.flags,
        })
        .await?;

    tracing::info!(thread_id = %thread.id, "Thread created");
    Ok((
        StatusCode::CREATED,
        success_with_message(thread, "Thread created successfully"),
    ))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Envelope<Thread>>> {
    let thread = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or(ApiError::ThreadNotFound(thread_id))?;
    Ok(success(thread))
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// One page of a thread's messages, oldest first. An unknown thread is an
/// empty page.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<Envelope<Vec<DBMessage>>>> {
    let page = MessageQuery::page(
        query.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT).max(1),
        query.offset.unwrap_or(0),
    );
    let messages = state.store.list_messages(&thread_id, page).await?;
    Ok(success(messages))
}

/// Regenerate and store the thread's summary from its latest messages
pub async fn refresh_summary(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Envelope<Thread>>> {
    if state.store.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    state.context.refresh_thread_summary(&thread_id).await;

    let thread = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or(ApiError::ThreadNotFound(thread_id))?;
    Ok(success_with_message(thread, "Thread summary updated"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFlagsRequest {
    pub flags: ThreadFlags,
    #[serde(default = "default_merge")]
    pub merge: bool,
    #[serde(default)]
    pub remove: Vec<String>,
}

fn default_merge() -> bool {
    true
}

pub async fn update_flags(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(req): Json<UpdateFlagsRequest>,
) -> ApiResult<Json<Envelope<Thread>>> {
    let mode = if req.merge {
        FlagMode::Merge
    } else {
        FlagMode::Replace
    };
    let thread =
        update_thread_flags(state.store.as_ref(), &thread_id, req.flags, mode, &req.remove)
            .await?;
    Ok(success_with_message(thread, "Thread flags updated successfully"))
}

#[derive(Debug, Deserialize)]
pub struct RemoveFlagsQuery {
    /// Comma separated flag names
    #[serde(default)]
    pub flags: String,
}

pub async fn remove_flags(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Query(query): Query<RemoveFlagsQuery>,
) -> ApiResult<Json<Envelope<Thread>>> {
    let remove: Vec<String> = query
        .flags
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();
    if remove.is_empty() {
        return Err(ApiError::BadRequest("Flags to remove are required".to_string()));
    }

    let thread = update_thread_flags(
        state.store.as_ref(),
        &thread_id,
        ThreadFlags::new(),
        FlagMode::Merge,
        &remove,
    )
    .await?;
    Ok(success_with_message(thread, "Thread flags removed successfully"))
}

#[derive(Debug, Serialize)]
pub struct GeneralCheckinResponse {
    pub thread: Option<Thread>,
    pub created: bool,
}

pub async fn get_general_checkin(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<GeneralCheckinResponse>>> {
    let thread = find_general_checkin_thread(state.store.as_ref()).await?;
    let message = if thread.is_some() {
        "Found existing general check-in thread"
    } else {
        "No general check-in thread found"
    };
    Ok(success_with_message(
        GeneralCheckinResponse {
            thread,
            created: false,
        },
        message,
    ))
}

pub async fn ensure_general_checkin(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<GeneralCheckinResponse>>> {
    if let Some(thread) = find_general_checkin_thread(state.store.as_ref()).await? {
        return Ok(success_with_message(
            GeneralCheckinResponse {
                thread: Some(thread),
                created: false,
            },
            "General check-in thread already exists",
        ));
    }

    let thread = find_or_create_general_checkin_thread(state.store.as_ref()).await?;
    Ok(success_with_message(
        GeneralCheckinResponse {
            thread: Some(thread),
            created: true,
        },
        "General check-in thread created successfully",
    ))
}
