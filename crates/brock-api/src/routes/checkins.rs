use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use brock_chat::ProactiveMessage;
use brock_persist::CheckinSchedule;
use brock_types::TimeOfDay;

use super::{success, success_with_message, Envelope};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveRequest {
    #[serde(default)]
    pub time_of_day: String,
}

/// Generate and deliver one check-in now, regardless of the schedule
pub async fn send_proactive(
    State(state): State<AppState>,
    Json(req): Json<ProactiveRequest>,
) -> ApiResult<Json<Envelope<ProactiveMessage>>> {
    let time_of_day: TimeOfDay = req.time_of_day.parse().map_err(|_| {
        ApiError::BadRequest(r#"Invalid timeOfDay. Must be "morning" or "afternoon""#.to_string())
    })?;

    let message = state.proactive.generate(time_of_day).await?;
    Ok(success_with_message(
        message,
        "Proactive check-in message sent successfully",
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleRequest {
    /// Local calendar day, defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// The check-in schedule for a day, created on first request
pub async fn ensure_schedule(
    State(state): State<AppState>,
    body: Option<Json<ScheduleRequest>>,
) -> ApiResult<Json<Envelope<CheckinSchedule>>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let date = req
        .date
        .unwrap_or_else(|| state.scheduler.local_date(Utc::now()));

    let schedule = state.scheduler.ensure_schedule(date).await?;
    Ok(success(schedule))
}

/// Send whatever check-ins are due right now
pub async fn tick(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<ProactiveMessage>>>> {
    let sent = state.scheduler.tick(Utc::now()).await?;
    let message = if sent.is_empty() {
        "No check-ins due"
    } else {
        "Due check-ins sent"
    };
    Ok(success_with_message(sent, message))
}
