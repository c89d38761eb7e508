//! Prompt types for docchat.

use serde::{Deserialize, Serialize};

/// Template variable holding the user's latest message.
pub const INPUT_VARIABLE: &str = "input";

/// Template variable holding the stuffed retrieved documents.
pub const CONTEXT_VARIABLE: &str = "context";

/// Placeholder name the chat history is spliced into.
pub const CHAT_HISTORY_PLACEHOLDER: &str = "chat_history";

/// A prompt override loaded from `.docchat/prompts/<id>.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// System prompt text with Handlebars syntax
    pub template: String,
}

/// One slot of a chat prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TemplateMessage {
    /// System message rendered from a Handlebars template
    System(String),

    /// Human message rendered from a Handlebars template
    Human(String),

    /// Named slot replaced by a list of messages at format time
    Placeholder(String),
}

/// An ordered list of message slots rendered into a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPromptTemplate {
    pub messages: Vec<TemplateMessage>,
}

impl ChatPromptTemplate {
    pub fn from_messages(messages: Vec<TemplateMessage>) -> Self {
        Self { messages }
    }

    /// The conversational shape used by both chain stages:
    /// system prompt, prior history, then the latest user input.
    pub fn conversational(system_template: impl Into<String>) -> Self {
        Self::from_messages(vec![
            TemplateMessage::System(system_template.into()),
            TemplateMessage::Placeholder(CHAT_HISTORY_PLACEHOLDER.to_string()),
            TemplateMessage::Human(format!("{{{{{}}}}}", INPUT_VARIABLE)),
        ])
    }

    /// Names of all placeholders in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|m| match m {
            TemplateMessage::Placeholder(name) => Some(name.as_str()),
            _ => None,
        })
    }
}
