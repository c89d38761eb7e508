//! Prompt system for docchat.
//!
//! This crate provides:
//! - Chat prompt templates (system message, history placeholder, human input)
//! - Handlebars rendering of template variables
//! - The built-in system prompts for query rewriting and both answer modes
//! - YAML overrides of those prompts from `.docchat/prompts/`

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::format_messages;
pub use loader::{list_prompts, load_prompt, PromptSet};
pub use types::{ChatPromptTemplate, PromptDefinition, TemplateMessage};
