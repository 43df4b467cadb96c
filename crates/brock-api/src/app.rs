use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    middleware::logging,
    routes::{chat, checkins, health, notifications, threads},
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Chat
        .route("/chat", post(chat::send_message))
        // Threads
        .route("/threads", get(threads::list_threads).post(threads::create_thread))
        .route(
            "/threads/general-checkin",
            get(threads::get_general_checkin).post(threads::ensure_general_checkin),
        )
        .route("/threads/:thread_id", get(threads::get_thread))
        .route("/threads/:thread_id/messages", get(threads::list_messages))
        .route("/threads/:thread_id/summary", post(threads::refresh_summary))
        .route(
            "/threads/:thread_id/flags",
            put(threads::update_flags).delete(threads::remove_flags),
        )
        // Check-ins
        .route("/checkins/proactive", post(checkins::send_proactive))
        .route("/checkins/schedule", post(checkins::ensure_schedule))
        .route("/checkins/tick", post(checkins::tick))
        // Notifications
        .route(
            "/notifications/register-device",
            post(notifications::register_device),
        );

    let timeout = Duration::from_secs(state.config.server.timeout_secs);
    let cors = build_cors_layer(&state.config);

    api_routes
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
