pub mod config;
pub mod events;
pub mod time_of_day;

pub use config::{ChatConfig, LLMConfig, ProactiveConfig};
pub use events::ChatEvent;
pub use time_of_day::TimeOfDay;
