//! HTTP adapter - REST API surface.

mod dto;
mod handlers;
mod routes;

pub use handlers::{ApiError, AppState};
pub use routes::api_router;
