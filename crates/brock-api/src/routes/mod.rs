pub mod chat;
pub mod checkins;
pub mod health;
pub mod notifications;
pub mod threads;

use axum::Json;
use serde::Serialize;

/// Body of every successful non-streaming response
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        data,
        message: None,
    })
}

pub fn success_with_message<T: Serialize>(data: T, message: &str) -> Json<Envelope<T>> {
    Json(Envelope {
        data,
        message: Some(message.to_string()),
    })
}
