//! Presentation layer for docchat: the chat page and its HTTP API.
//!
//! The view model turns a session's display log into widgets, the page
//! module renders them to HTML, and the axum router serves both the page
//! and a small JSON API. Sessions are per browser, keyed by a cookie.

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;
pub mod view;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
