use crate::assembler::ThreadContext;
use crate::profile::Profile;
use crate::templates::{render, SYSTEM_PROMPT_TEMPLATE};

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn schedule_line(profile: &Profile) -> String {
    let s = &profile.schedule_constraints;
    let mut parts = Vec::new();
    if !s.preferred_workout_times.is_empty() {
        parts.push(format!("prefers {}", s.preferred_workout_times.join(", ")));
    }
    if !s.busy_days.is_empty() {
        parts.push(format!("busy on {}", s.busy_days.join(", ")));
    }
    if let Some(duration) = &s.available_duration {
        parts.push(format!("{} per session", duration));
    }
    if parts.is_empty() {
        "flexible".to_string()
    } else {
        parts.join("; ")
    }
}

/// Render the coaching system prompt. Pure and deterministic.
pub fn build_system_prompt(profile: &Profile, context: &ThreadContext) -> String {
    let diet = &profile.dietary_preferences;
    let protein = diet
        .protein_target
        .map_or_else(|| "not specified".to_string(), |g| format!("{}g", g));
    let topic = context
        .topic
        .as_deref()
        .map(|t| format!(" (Topic: {})", t))
        .unwrap_or_default();
    let summary = context
        .summary
        .as_deref()
        .map(|s| format!("\n- Summary: {}", s))
        .unwrap_or_default();
    let schedule = schedule_line(profile);
    let equipment = join_or(&profile.equipment, "basic home gym");
    let injuries = join_or(&profile.past_injuries, "none noted");
    let goals = join_or(&profile.high_level_goals, "general fitness");

    render(
        SYSTEM_PROMPT_TEMPLATE,
        &[
            ("name", &profile.name),
            ("timezone", &profile.timezone),
            ("schedule", &schedule),
            ("equipment", &equipment),
            ("injuries", &injuries),
            ("diet_style", diet.style.as_deref().unwrap_or("flexible")),
            ("protein_target", &protein),
            ("meal_timing", diet.meal_timing.as_deref().unwrap_or("not specified")),
            ("goals", &goals),
            ("title", &context.title),
            ("topic", &topic),
            ("summary", &summary),
        ],
    )
}
