mod activities;
mod goals;
mod nutrition;
mod time;

pub use activities::{FetchActivitiesTool, LogActivityTool};
pub use goals::{CreateGoalTool, FetchGoalsTool};
pub use nutrition::FetchDailyNutritionTool;
pub use time::GetCurrentTimeTool;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::handler::ToolError;

/// Hard ceiling on rows any list tool returns
pub const MAX_LIMIT: u32 = 100;

/// Model-supplied limit, clamped to `1..=MAX_LIMIT`.
/// JSON Schema `number` may arrive as `10` or `10.0`.
pub(crate) fn clamp_limit(requested: Option<f64>, default: u32) -> u32 {
    match requested {
        Some(n) if n.is_finite() && n >= 1.0 => (n.floor() as u32).min(MAX_LIMIT),
        Some(_) => 1,
        None => default,
    }
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ToolError::InvalidArguments(format!("{field} must be YYYY-MM-DD, got '{value}'"))
    })
}

/// Treat `""` like an absent optional string
pub(crate) fn non_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(d)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
