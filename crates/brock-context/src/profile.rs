use serde::{Deserialize, Serialize};

/// Stable facts about the user. Read-only for the core; loaded from
/// configuration, falling back to the built-in profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub timezone: String,
    pub schedule_constraints: ScheduleConstraints,
    pub equipment: Vec<String>,
    pub past_injuries: Vec<String>,
    pub dietary_preferences: DietaryPreferences,
    pub high_level_goals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConstraints {
    pub preferred_workout_times: Vec<String>,
    pub busy_days: Vec<String>,
    pub available_duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietaryPreferences {
    pub style: Option<String>,
    pub protein_target: Option<u32>,
    pub avoid_foods: Vec<String>,
    pub meal_timing: Option<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "James".to_string(),
            timezone: "America/New_York".to_string(),
            schedule_constraints: ScheduleConstraints {
                preferred_workout_times: strings(&["morning", "early_evening"]),
                busy_days: strings(&["monday", "wednesday"]),
                available_duration: Some("45-60 minutes".to_string()),
            },
            equipment: strings(&["dumbbells", "resistance_bands", "pull_up_bar", "yoga_mat"]),
            past_injuries: strings(&["left_shoulder_impingement_2023"]),
            dietary_preferences: DietaryPreferences {
                style: Some("flexible".to_string()),
                protein_target: Some(165),
                avoid_foods: Vec::new(),
                meal_timing: Some("intermittent_fasting_16_8".to_string()),
            },
            high_level_goals: strings(&[
                "Build sustainable fitness habits",
                "Improve running endurance for half marathon",
                "Maintain healthy body composition",
                "Optimize sleep and recovery",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_profile_keeps_defaults_per_field() {
        let profile: Profile = serde_json::from_str(r#"{"name": "Sam", "equipment": []}"#).unwrap();
        assert_eq!(profile.name, "Sam");
        assert!(profile.equipment.is_empty());
        // Unspecified sections fall back to the built-in profile
        assert_eq!(profile.dietary_preferences.protein_target, Some(165));
    }
}
