//! Chat turns and proactive check-ins for the Brock coach.
//!
//! [`ChatOrchestrator`] runs one streamed, tool-calling turn per user
//! message and reports progress as [`brock_types::ChatEvent`]s.
//! [`ProactiveGenerator`] and [`CheckinScheduler`] write unprompted
//! check-ins into the general check-in thread.

mod accumulator;
mod error;
mod orchestrator;
mod proactive;
mod push;
mod schedule;
mod templates;
mod threads;
mod title;

pub use accumulator::{PartialToolCall, ResolvedCall, ToolCallTable, UNKNOWN_TOOL_NAME};
pub use error::{ChatError, Result};
pub use orchestrator::{ChatOrchestrator, STREAM_ERROR_MESSAGE};
pub use proactive::{ProactiveGenerator, ProactiveMessage};
pub use push::{HttpPushSender, LogPushSender, Notification, NotificationType, PushSender};
pub use schedule::{generate_schedule, is_due, CheckinScheduler};
pub use threads::{
    find_general_checkin_thread, find_or_create_general_checkin_thread, update_thread_flags,
    FlagMode, CHECKIN_THREAD_SUMMARY, CHECKIN_THREAD_TITLE, CHECKIN_THREAD_TOPIC,
};
pub use title::TitleGenerator;
