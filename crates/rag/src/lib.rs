//! Retrieval-augmented answering for docchat.
//!
//! This crate owns everything between a user message and the payload the
//! presentation layer renders:
//! - Documents and retrievers over a pre-built index
//! - The conversational retrieval chain (query rewrite, then stuffed answer)
//! - Citation extraction from document metadata
//! - The per-mode payload shapes and the orchestrator producing them
//! - Per-user chat session state

pub mod chain;
pub mod citation;
pub mod document;
pub mod payload;
pub mod responder;
pub mod retriever;
pub mod session;

#[cfg(test)]
mod tests;

// Re-export main types
pub use chain::{Answer, ChainInput, ChainOutput, ConversationalRetrievalChain, RagChain};
pub use citation::{collect_citations, SourceCitation};
pub use document::Document;
pub use payload::{
    AssistantPayload, DocumentHit, DocumentSearchPayload, FileInfo, InquiryPayload, Mode,
    NoFileFound,
};
pub use responder::{respond_with, shape_payload, ResponseOrchestrator};
pub use retriever::{KeywordRetriever, Retriever, StaticRetriever};
pub use session::{ChatSession, ConversationTurn};

use docchat_core::{AppConfig, AppError, AppResult};
use docchat_prompt::PromptSet;
use std::sync::Arc;

/// Load the keyword retriever over the configured document index.
pub fn load_retriever(config: &AppConfig) -> AppResult<Arc<dyn Retriever>> {
    let index_path = config.index_path();
    let retriever = KeywordRetriever::from_jsonl(&index_path, config.retrieval.top_k)?;

    if retriever.is_empty() {
        tracing::warn!("Document index {} is empty", index_path.display());
    }

    Ok(Arc::new(retriever))
}

/// Build the orchestrator for the configured provider, model and prompts.
pub fn build_orchestrator(config: &AppConfig) -> AppResult<ResponseOrchestrator> {
    let api_key = config.resolve_api_key(&config.provider);
    let client = docchat_llm::create_client(
        &config.provider,
        config.provider_endpoint(),
        api_key.as_deref(),
    )
    .map_err(AppError::Llm)?;

    let prompts = PromptSet::load(&config.workspace)?;

    tracing::info!(
        "Using {} provider with model {}",
        client.provider_name(),
        config.model
    );

    Ok(ResponseOrchestrator::new(
        client,
        config.model.clone(),
        config.temperature,
        prompts,
    ))
}
