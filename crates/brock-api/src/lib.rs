//! HTTP surface of the Brock coaching backend.
//!
//! `POST /chat` streams a turn as Server-Sent Events; the remaining routes
//! read threads and trigger check-ins.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
