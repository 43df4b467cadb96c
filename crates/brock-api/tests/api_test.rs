use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use brock_api::{build_router, AppState, Config};
use brock_chat::{LogPushSender, STREAM_ERROR_MESSAGE};
use brock_llm::testing::{finish, text, tool_call, ScriptedChatClient};
use brock_persist::{DBMessage, MemoryPersistenceClient, NewThread, PersistenceClient};
use brock_tools::FixedClock;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

const TEST_CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [checkin]
    utc_offset_minutes = -240
"#;

struct TestApp {
    router: Router,
    store: Arc<MemoryPersistenceClient>,
}

fn test_app(llm: ScriptedChatClient) -> TestApp {
    let config: Config = toml::from_str(TEST_CONFIG).unwrap();
    let store = Arc::new(MemoryPersistenceClient::new());
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap()));
    let state = AppState::from_parts(
        config,
        store.clone(),
        Arc::new(llm),
        Arc::new(LogPushSender),
        clock,
    )
    .unwrap();
    TestApp {
        router: build_router(state),
        store,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(router, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

/// `(event, data)` pairs in stream order
fn parse_sse(body: &str) -> Vec<(String, Value)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event: ") {
                    event = Some(name.to_string());
                } else if let Some(payload) = line.strip_prefix("data: ") {
                    data = serde_json::from_str(payload).ok();
                }
            }
            Some((event?, data?))
        })
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = test_app(ScriptedChatClient::new());
    let (status, body) = send_json(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["storage"], "connected");
}

#[tokio::test]
async fn test_health_reports_store_outage() {
    let app = test_app(ScriptedChatClient::new());
    app.store.set_offline(true);

    let (status, body) = send_json(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_chat_streams_named_events() {
    let app = test_app(
        ScriptedChatClient::new()
            .push_stream(vec![tool_call(0, "call_1", "get_current_time", "{}"), finish("tool_calls")])
            .push_stream(vec![text("It's 9:30"), text(" in the morning."), finish("stop")])
            .push_reply("Morning Time Check"),
    );
    let thread = app.store.create_thread(NewThread::titled("New Chat")).await.unwrap();

    let (status, body) = send(
        &app.router,
        "POST",
        "/chat",
        Some(json!({"threadId": thread.id, "userMessage": "What time is it?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let events = parse_sse(&body);
    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["tool_start", "tool_result", "message", "message", "done"]
    );
    assert_eq!(events[0].1, json!({"name": "get_current_time"}));
    assert_eq!(events[1].1["result"]["success"], true);
    assert_eq!(events[2].1, json!({"content": "It's 9:30"}));

    let stored = app.store.get_thread(&thread.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Morning Time Check");
}

#[tokio::test]
async fn test_chat_rejects_missing_fields_before_streaming() {
    let app = test_app(ScriptedChatClient::new());

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/chat",
        Some(json!({"threadId": "t1", "userMessage": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User message is required");

    let (status, body) =
        send_json(&app.router, "POST", "/chat", Some(json!({"userMessage": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Thread ID is required");
}

#[tokio::test]
async fn test_chat_model_failure_ends_with_error_event() {
    let app = test_app(ScriptedChatClient::new().push_stream_failure("upstream 503"));
    let thread = app.store.create_thread(NewThread::titled("New Chat")).await.unwrap();

    let (status, body) = send(
        &app.router,
        "POST",
        "/chat",
        Some(json!({"threadId": thread.id, "userMessage": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let events = parse_sse(&body);
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "error");
    assert_eq!(data["message"], STREAM_ERROR_MESSAGE);
    assert!(!body.contains("upstream 503"));
    assert!(!events.iter().any(|(name, _)| name == "done"));
}

#[tokio::test]
async fn test_thread_crud() {
    let app = test_app(ScriptedChatClient::new());

    let (status, created) = send_json(
        &app.router,
        "POST",
        "/threads",
        Some(json!({"title": "Leg day", "topic": "Training"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Thread created successfully");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, fetched) = send_json(&app.router, "GET", &format!("/threads/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["title"], "Leg day");
    assert_eq!(fetched["data"]["topic"], "Training");

    let (status, listed) = send_json(&app.router, "GET", "/threads?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (status, _) = send_json(&app.router, "GET", "/threads/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_thread_requires_title() {
    let app = test_app(ScriptedChatClient::new());
    let (status, body) =
        send_json(&app.router, "POST", "/threads", Some(json!({"title": " "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn test_messages_page_in_chronological_order() {
    let app = test_app(
        ScriptedChatClient::new()
            .push_stream(vec![text("Hey!"), finish("stop")])
            .push_reply("Greeting"),
    );
    let thread = app.store.create_thread(NewThread::titled("New Chat")).await.unwrap();
    send(
        &app.router,
        "POST",
        "/chat",
        Some(json!({"threadId": thread.id, "userMessage": "hello"})),
    )
    .await;

    let (status, page) = send_json(
        &app.router,
        "GET",
        &format!("/threads/{}/messages?limit=10&offset=0", thread.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = page["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "hello");
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["content"], "Hey!");
    assert_eq!(messages[1]["sender"], "brock");

    let (_, second) = send_json(
        &app.router,
        "GET",
        &format!("/threads/{}/messages?limit=10&offset=1", thread.id),
        None,
    )
    .await;
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_general_checkin_flag_moves_between_threads() {
    let app = test_app(ScriptedChatClient::new());

    let (status, body) = send_json(&app.router, "GET", "/threads/general-checkin", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["thread"].is_null());

    let (_, body) = send_json(&app.router, "POST", "/threads/general-checkin", None).await;
    assert_eq!(body["data"]["created"], true);
    let first = body["data"]["thread"]["id"].as_str().unwrap().to_string();

    let (_, body) = send_json(&app.router, "POST", "/threads/general-checkin", None).await;
    assert_eq!(body["data"]["created"], false);
    assert_eq!(body["data"]["thread"]["id"], first.as_str());

    let other = app.store.create_thread(NewThread::titled("Other")).await.unwrap();
    let (status, body) = send_json(
        &app.router,
        "PUT",
        &format!("/threads/{}/flags", other.id),
        Some(json!({"flags": {"is_general_checkin": true}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Thread flags updated successfully");

    let first_thread = app.store.get_thread(&first).await.unwrap().unwrap();
    assert!(!first_thread.is_general_checkin());
    // Merge keeps the other flags
    assert_eq!(first_thread.flags["icon"], "clock.badge.checkmark");

    let (_, body) = send_json(&app.router, "GET", "/threads/general-checkin", None).await;
    assert_eq!(body["data"]["thread"]["id"], other.id.as_str());
}

#[tokio::test]
async fn test_remove_flags() {
    let app = test_app(ScriptedChatClient::new());
    let thread = app
        .store
        .create_thread(
            NewThread::titled("Flagged")
                .with_flag("pinned", true)
                .with_flag("icon", "star"),
        )
        .await
        .unwrap();

    let (status, body) = send_json(
        &app.router,
        "DELETE",
        &format!("/threads/{}/flags?flags=pinned", thread.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["flags"].get("pinned").is_none());
    assert_eq!(body["data"]["flags"]["icon"], "star");

    let (status, _) =
        send_json(&app.router, "DELETE", "/threads/missing/flags?flags=pinned", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_proactive_checkin_endpoint() {
    let app = test_app(ScriptedChatClient::new().push_reply("Good morning! Ready to move?"));

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/checkins/proactive",
        Some(json!({"timeOfDay": "morning"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Proactive check-in message sent successfully");
    assert_eq!(body["data"]["content"], "Good morning! Ready to move?");
    assert_eq!(body["data"]["timeOfDay"], "morning");
    assert_eq!(body["data"]["notificationsDelivered"], 0);
}

#[tokio::test]
async fn test_proactive_checkin_rejects_bad_time_of_day() {
    let app = test_app(ScriptedChatClient::new());
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/checkins/proactive",
        Some(json!({"timeOfDay": "midnight"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], r#"Invalid timeOfDay. Must be "morning" or "afternoon""#);
}

#[tokio::test]
async fn test_schedule_is_created_once_per_day() {
    let app = test_app(ScriptedChatClient::new());
    let request = json!({"date": "2024-05-01"});

    let (status, first) =
        send_json(&app.router, "POST", "/checkins/schedule", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["date"], "2024-05-01");
    assert_eq!(first["data"]["morning_sent"], false);

    let (_, second) = send_json(&app.router, "POST", "/checkins/schedule", Some(request)).await;
    assert_eq!(first["data"], second["data"]);

    // No body means today
    let (status, _) = send_json(&app.router, "POST", "/checkins/schedule", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_device() {
    let app = test_app(ScriptedChatClient::new());

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/notifications/register-device",
        Some(json!({"deviceToken": "abc123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Device token registered successfully");

    send_json(
        &app.router,
        "POST",
        "/notifications/register-device",
        Some(json!({"deviceToken": "abc123"})),
    )
    .await;
    assert_eq!(app.store.list_device_tokens().await.unwrap(), vec!["abc123".to_string()]);

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/notifications/register-device",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Device token is required");
}

#[tokio::test]
async fn test_refresh_summary() {
    let app = test_app(ScriptedChatClient::new().push_reply("James is planning a half marathon block."));
    let thread = app.store.create_thread(NewThread::titled("Running")).await.unwrap();
    app.store
        .save_message(DBMessage::user(&thread.id, "Help me plan for a half marathon"))
        .await
        .unwrap();

    let (status, body) = send_json(
        &app.router,
        "POST",
        &format!("/threads/{}/summary", thread.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"], "James is planning a half marathon block.");

    let (status, _) = send_json(&app.router, "POST", "/threads/missing/summary", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
