//! Renders chat prompt templates into concrete chat messages.

use crate::types::{ChatPromptTemplate, TemplateMessage};
use docchat_core::{AppError, AppResult, ChatMessage};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Format a chat prompt template.
///
/// System and human slots are rendered with Handlebars using `variables`;
/// placeholder slots are replaced, in place, by the message list registered
/// under the same name in `placeholders`.
///
/// # Errors
/// Fails when a template does not parse or a placeholder has no messages
/// registered (an empty list is fine).
///
/// # Example
/// ```
/// use docchat_core::ChatMessage;
/// use docchat_prompt::{format_messages, ChatPromptTemplate};
/// use std::collections::HashMap;
///
/// let template = ChatPromptTemplate::conversational("Be concise.");
/// let variables = HashMap::from([("input".to_string(), "What is Rust?".to_string())]);
/// let placeholders = HashMap::from([("chat_history".to_string(), Vec::new())]);
///
/// let messages = format_messages(&template, &variables, &placeholders).unwrap();
/// assert_eq!(messages.last(), Some(&ChatMessage::user("What is Rust?")));
/// ```
pub fn format_messages(
    template: &ChatPromptTemplate,
    variables: &HashMap<String, String>,
    placeholders: &HashMap<String, Vec<ChatMessage>>,
) -> AppResult<Vec<ChatMessage>> {
    let mut messages = Vec::with_capacity(template.messages.len());

    for slot in &template.messages {
        match slot {
            TemplateMessage::System(text) => {
                messages.push(ChatMessage::system(render_template(text, variables)?));
            }
            TemplateMessage::Human(text) => {
                messages.push(ChatMessage::user(render_template(text, variables)?));
            }
            TemplateMessage::Placeholder(name) => {
                let history = placeholders.get(name).ok_or_else(|| {
                    AppError::Prompt(format!("No messages provided for placeholder '{}'", name))
                })?;
                messages.extend(history.iter().cloned());
            }
        }
    }

    tracing::trace!("Formatted {} chat messages", messages.len());
    Ok(messages)
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
