//! Conversational retrieval chain.
//!
//! Two stages share one chat model:
//! 1. [`HistoryAwareRetriever`] turns a follow-up into a standalone question
//!    (only when there is history) and retrieves documents for it.
//! 2. [`StuffDocumentsChain`] stuffs those documents into the answer prompt
//!    and asks the model for the answer.
//!
//! [`ConversationalRetrievalChain`] runs both behind the [`RagChain`] trait,
//! which is what the response orchestrator depends on.

use crate::document::Document;
use crate::retriever::Retriever;
use docchat_core::{AppResult, ChatMessage};
use docchat_llm::{LlmClient, LlmRequest};
use docchat_prompt::types::{CHAT_HISTORY_PLACEHOLDER, CONTEXT_VARIABLE, INPUT_VARIABLE};
use docchat_prompt::{format_messages, ChatPromptTemplate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Separator placed between stuffed documents.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Input of one chain invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInput {
    pub input: String,
    pub chat_history: Vec<ChatMessage>,
}

/// Result of one chain invocation.
///
/// `context` and `answer` are optional because chain implementations may
/// omit them; the orchestrator decides what a missing value means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainOutput {
    pub input: String,
    pub chat_history: Vec<ChatMessage>,

    #[serde(default)]
    pub context: Option<Vec<Document>>,

    #[serde(default)]
    pub answer: Option<Answer>,
}

/// Answer produced by the combine step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),

    /// Structured answer; the text lives in its `text` field when present
    Structured(Value),
}

impl Answer {
    /// Plain text of the answer.
    ///
    /// Structured answers without a string `text` field are rendered as JSON.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => match value.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => value.to_string(),
            },
        }
    }
}

/// A retrieval-augmented chain.
#[async_trait::async_trait]
pub trait RagChain: Send + Sync {
    /// Run the chain. `Ok(None)` means the chain completed without a result.
    async fn invoke(&self, input: &ChainInput) -> AppResult<Option<ChainOutput>>;
}

/// An LLM client bound to a model and sampling temperature.
#[derive(Clone)]
pub struct ChatModel {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
}

impl ChatModel {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Complete a conversation and return the generated text.
    pub async fn generate(&self, messages: Vec<ChatMessage>) -> AppResult<String> {
        let request = LlmRequest::new(messages, &self.model).with_temperature(self.temperature);
        let response = self.client.complete(&request).await?;

        tracing::debug!(
            "{} usage - prompt: {}, completion: {}",
            self.client.provider_name(),
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );

        Ok(response.content)
    }
}

fn history_placeholders(chat_history: &[ChatMessage]) -> HashMap<String, Vec<ChatMessage>> {
    HashMap::from([(CHAT_HISTORY_PLACEHOLDER.to_string(), chat_history.to_vec())])
}

/// Retriever that makes follow-up questions self-contained first.
pub struct HistoryAwareRetriever {
    model: ChatModel,
    retriever: Arc<dyn Retriever>,
    prompt: ChatPromptTemplate,
}

impl HistoryAwareRetriever {
    pub fn new(model: ChatModel, retriever: Arc<dyn Retriever>, prompt: ChatPromptTemplate) -> Self {
        Self {
            model,
            retriever,
            prompt,
        }
    }

    /// Question actually sent to the retriever.
    ///
    /// Without history the input is used verbatim and no LLM call is made.
    pub async fn standalone_question(&self, input: &ChainInput) -> AppResult<String> {
        if input.chat_history.is_empty() {
            return Ok(input.input.clone());
        }

        let variables = HashMap::from([(INPUT_VARIABLE.to_string(), input.input.clone())]);
        let messages = format_messages(
            &self.prompt,
            &variables,
            &history_placeholders(&input.chat_history),
        )?;

        let question = self.model.generate(messages).await?;
        tracing::debug!("Rewrote query {:?} as {:?}", input.input, question);
        Ok(question)
    }

    pub async fn retrieve(&self, input: &ChainInput) -> AppResult<Vec<Document>> {
        let question = self.standalone_question(input).await?;
        self.retriever.retrieve(&question).await
    }
}

/// Answers from all retrieved documents stuffed into one prompt.
pub struct StuffDocumentsChain {
    model: ChatModel,
    prompt: ChatPromptTemplate,
}

impl StuffDocumentsChain {
    pub fn new(model: ChatModel, prompt: ChatPromptTemplate) -> Self {
        Self { model, prompt }
    }

    /// Join document contents for the `{{context}}` variable.
    pub fn format_documents(documents: &[Document]) -> String {
        documents
            .iter()
            .map(|doc| doc.page_content.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }

    pub async fn answer(&self, input: &ChainInput, documents: &[Document]) -> AppResult<String> {
        let variables = HashMap::from([
            (INPUT_VARIABLE.to_string(), input.input.clone()),
            (CONTEXT_VARIABLE.to_string(), Self::format_documents(documents)),
        ]);
        let messages = format_messages(
            &self.prompt,
            &variables,
            &history_placeholders(&input.chat_history),
        )?;

        self.model.generate(messages).await
    }
}

/// History-aware retrieval followed by a stuff-documents answer.
pub struct ConversationalRetrievalChain {
    retriever: HistoryAwareRetriever,
    combine: StuffDocumentsChain,
}

impl ConversationalRetrievalChain {
    pub fn new(retriever: HistoryAwareRetriever, combine: StuffDocumentsChain) -> Self {
        Self { retriever, combine }
    }
}

#[async_trait::async_trait]
impl RagChain for ConversationalRetrievalChain {
    async fn invoke(&self, input: &ChainInput) -> AppResult<Option<ChainOutput>> {
        let documents = self.retriever.retrieve(input).await?;
        tracing::info!("Retrieved {} context documents", documents.len());

        // Nothing to answer from; the caller reports the empty context
        let answer = if documents.is_empty() {
            None
        } else {
            Some(Answer::Text(self.combine.answer(input, &documents).await?))
        };

        Ok(Some(ChainOutput {
            input: input.input.clone(),
            chat_history: input.chat_history.clone(),
            context: Some(documents),
            answer,
        }))
    }
}
