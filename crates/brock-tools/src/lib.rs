//! Tool registry for model function calling.
//!
//! Each tool is a single type that owns both its JSON schema and its
//! implementation. The registry never fails: every outcome, including
//! unknown names and bad arguments, comes back as a [`ToolResult`].

pub mod clock;
pub mod handler;
pub mod registry;
pub mod result;
pub mod tools;

pub use clock::{Clock, FixedClock, SystemClock};
pub use handler::{ToolError, ToolHandler, ToolOutput};
pub use registry::ToolRegistry;
pub use result::ToolResult;
