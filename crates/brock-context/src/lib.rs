mod assembler;
mod profile;
mod prompt;
mod templates;

pub use assembler::{ContextAssembler, ThreadContext};
pub use profile::{DietaryPreferences, Profile, ScheduleConstraints};
pub use prompt::build_system_prompt;
pub use templates::{
    render as render_template, SUMMARY_FALLBACK, SUMMARY_EMPTY_THREAD, SUMMARY_SYSTEM_PROMPT, SYSTEM_PROMPT_TEMPLATE,
    UNKNOWN_THREAD_TITLE,
};
