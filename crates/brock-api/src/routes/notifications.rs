use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{success_with_message, Envelope};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    #[serde(default)]
    pub device_token: String,
}

/// Register a device for push notifications; registering twice is a no-op
pub async fn register_device(
    State(state): State<AppState>,
    Json(req): Json<RegisterDeviceRequest>,
) -> ApiResult<Json<Envelope<Value>>> {
    let token = req.device_token.trim();
    if token.is_empty() {
        return Err(ApiError::BadRequest("Device token is required".to_string()));
    }

    state.store.register_device_token(token).await?;
    tracing::info!(
        token_prefix = %token.chars().take(20).collect::<String>(),
        "Device token registered"
    );

    Ok(success_with_message(
        json!({ "deviceToken": token }),
        "Device token registered successfully",
    ))
}
