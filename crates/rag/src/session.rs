//! Per-user chat session state.

use crate::payload::{AssistantPayload, Mode};
use crate::retriever::Retriever;
use docchat_core::ChatMessage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One entry of the display log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationTurn {
    User { content: String },
    Assistant { content: AssistantPayload },
}

/// Everything one user's conversation needs between requests.
pub struct ChatSession {
    /// Selected answer mode
    pub mode: Mode,

    /// Display log rendered by the presentation layer
    pub messages: Vec<ConversationTurn>,

    /// Flat history handed to the retrieval chain
    pub chat_history: Vec<ChatMessage>,

    /// Pre-built document retriever
    pub retriever: Arc<dyn Retriever>,
}

impl ChatSession {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            mode: Mode::default(),
            messages: Vec::new(),
            chat_history: Vec::new(),
            retriever,
        }
    }

    /// Append a successful exchange to the display log.
    pub fn record_turn(&mut self, user_message: impl Into<String>, payload: AssistantPayload) {
        self.messages.push(ConversationTurn::User {
            content: user_message.into(),
        });
        self.messages.push(ConversationTurn::Assistant { content: payload });
    }
}
