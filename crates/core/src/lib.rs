//! Docchat Core Library
//!
//! This crate provides the foundational utilities shared by every docchat crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - The chat message type exchanged with LLMs and kept in session history

pub mod config;
pub mod error;
pub mod logging;
pub mod message;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use message::{ChatMessage, Role};
