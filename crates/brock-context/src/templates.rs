// Prompt templates. Placeholders are `<name>` and are filled by `render`.

pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are Brock, a concise, action-oriented personal coach for <name>. You provide practical, personalized fitness and health guidance.

PROFILE:
- Name: <name>
- Timezone: <timezone>
- Schedule: <schedule>
- Equipment: <equipment>
- Past injuries: <injuries>
- Dietary style: <diet_style>
- Protein target: <protein_target>
- Meal timing: <meal_timing>
- High-level goals: <goals>

CURRENT CONVERSATION:
- Thread: "<title>"<topic><summary>

GUIDELINES:
- Be concise and actionable
- Use tools to fetch current data when relevant
- Reference past conversation context when helpful
- Focus on practical next steps
- Maintain encouraging but realistic tone

Use available tools to fetch goals, activities, nutrition data, or log new activities when they would improve your response accuracy."#;

pub const SUMMARY_SYSTEM_PROMPT: &str = "Summarize this conversation thread in 1-2 sentences, focusing on the main topic and any key decisions or progress.";

/// Summary of a thread with no messages
pub const SUMMARY_EMPTY_THREAD: &str = "New conversation";

/// Summary used when generation fails
pub const SUMMARY_FALLBACK: &str = "Conversation about fitness and health";

/// Title of a thread whose context could not be loaded
pub const UNKNOWN_THREAD_TITLE: &str = "Unknown Thread";

/// Fill `<key>` placeholders in one pass, so substituted values are never
/// re-scanned for placeholders.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = vars.iter().find(|(key, _)| {
            tail.strip_prefix('<')
                .and_then(|t| t.strip_prefix(*key))
                .is_some_and(|t| t.starts_with('>'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_pass() {
        let out = render("Hi <name>, thread <title> <unknown>", &[("name", "<title>"), ("title", "Legs")]);
        assert_eq!(out, "Hi <title>, thread Legs <unknown>");
    }

    #[test]
    fn test_render_repeated_key() {
        assert_eq!(render("<a>-<a>", &[("a", "x")]), "x-x");
    }
}
