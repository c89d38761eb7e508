//! Response orchestration for one chat turn.
//!
//! Builds the two chat prompts for the session's mode, runs the retrieval
//! chain, validates what came back and shapes it into the mode's payload.

use crate::chain::{
    ChainInput, ChatModel, ConversationalRetrievalChain, HistoryAwareRetriever, RagChain,
    StuffDocumentsChain,
};
use crate::citation::{collect_citations, SourceCitation};
use crate::payload::{
    AssistantPayload, DocumentHit, DocumentSearchPayload, FileInfo, InquiryPayload, Mode,
    NoFileFound,
};
use crate::session::ChatSession;
use docchat_core::{AppError, AppResult, ChatMessage};
use docchat_llm::LlmClient;
use docchat_prompt::{ChatPromptTemplate, PromptSet};
use std::sync::Arc;
use std::time::Instant;

/// Answer used when the chain result carries no answer.
pub const ANSWER_FALLBACK: &str = "The answer could not be generated.";

/// Caption above the secondary citations of a document search.
pub const SUB_MESSAGE: &str = "Other reference documents:";

/// Caption above the file list of an inquiry.
pub const FILE_LIST_MESSAGE: &str = "Documents referenced:";

/// Turns user messages into display payloads.
pub struct ResponseOrchestrator {
    model: ChatModel,
    prompts: PromptSet,
}

impl ResponseOrchestrator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        temperature: f32,
        prompts: PromptSet,
    ) -> Self {
        Self {
            model: ChatModel::new(client, model, temperature),
            prompts,
        }
    }

    /// Prompt asking the model for a standalone version of the question.
    pub fn query_rewrite_template(&self) -> ChatPromptTemplate {
        ChatPromptTemplate::conversational(self.prompts.query_rewrite.clone())
    }

    /// Prompt answering from the retrieved context, per mode.
    pub fn answer_template(&self, mode: Mode) -> ChatPromptTemplate {
        let system = match mode {
            Mode::DocumentSearch => &self.prompts.document_search,
            Mode::Inquiry => &self.prompts.inquiry,
        };
        ChatPromptTemplate::conversational(system.clone())
    }

    /// Assemble the retrieval chain for the session's retriever and mode.
    pub fn build_chain(&self, session: &ChatSession) -> ConversationalRetrievalChain {
        ConversationalRetrievalChain::new(
            HistoryAwareRetriever::new(
                self.model.clone(),
                session.retriever.clone(),
                self.query_rewrite_template(),
            ),
            StuffDocumentsChain::new(self.model.clone(), self.answer_template(session.mode)),
        )
    }

    /// Answer `message` within `session`.
    pub async fn respond(
        &self,
        session: &mut ChatSession,
        message: &str,
    ) -> AppResult<AssistantPayload> {
        tracing::info!(
            "Answering in {} mode with model {}",
            session.mode,
            self.model.model()
        );

        let chain = self.build_chain(session);
        respond_with(&chain, session, message).await
    }
}

/// Run `chain` for `message` and shape the result for `session.mode`.
///
/// On any failure the session is left exactly as it was.
pub async fn respond_with(
    chain: &dyn RagChain,
    session: &mut ChatSession,
    message: &str,
) -> AppResult<AssistantPayload> {
    let input = ChainInput {
        input: message.to_string(),
        chat_history: session.chat_history.clone(),
    };

    let start = Instant::now();

    let output = chain.invoke(&input).await.map_err(|e| {
        tracing::error!("Retrieval chain failed: {}", e);
        AppError::Chain(e.to_string())
    })?;

    tracing::debug!(
        "Retrieval chain finished in {:.2}s",
        start.elapsed().as_secs_f64()
    );

    let output = output.ok_or_else(|| {
        tracing::error!("Retrieval chain returned no result");
        AppError::EmptyChainResult
    })?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => tracing::debug!("Chain result:\n{}", json),
            Err(e) => tracing::debug!("Chain result is not serializable: {}", e),
        }
    }

    let documents = match output.context {
        Some(ref docs) if !docs.is_empty() => docs,
        _ => return Err(AppError::NoRelevantDocuments),
    };

    let answer_text = output
        .answer
        .as_ref()
        .map(|answer| answer.text())
        .unwrap_or_else(|| ANSWER_FALLBACK.to_string());

    // Both entries carry the user role: the chain history is a flat log
    session.chat_history.extend([
        ChatMessage::user(message),
        ChatMessage::user(answer_text.clone()),
    ]);

    let citations = collect_citations(documents);
    tracing::info!("Answer cites {} sources", citations.len());

    Ok(shape_payload(session.mode, answer_text, citations))
}

/// Reshape an answer and its citations into the display schema of `mode`.
pub fn shape_payload(
    mode: Mode,
    answer: String,
    citations: Vec<SourceCitation>,
) -> AssistantPayload {
    match mode {
        Mode::DocumentSearch => {
            let mut citations = citations.into_iter();
            let payload = match citations.next() {
                Some(main) => DocumentSearchPayload::Found(DocumentHit {
                    main_message: answer,
                    main_file_path: main.source,
                    main_page_number: main.page_number,
                    sub_message: Some(SUB_MESSAGE.to_string()),
                    sub_choices: citations.collect(),
                }),
                None => DocumentSearchPayload::NoFileFound(NoFileFound::new(answer)),
            };
            AssistantPayload::DocumentSearch(payload)
        }
        Mode::Inquiry => AssistantPayload::Inquiry(InquiryPayload {
            answer,
            message: Some(FILE_LIST_MESSAGE.to_string()),
            file_info_list: Some(
                citations
                    .iter()
                    .map(|citation| FileInfo::Text(citation.to_string()))
                    .collect(),
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Answer, ChainOutput};
    use crate::document::Document;
    use crate::retriever::StaticRetriever;
    use crate::tests::{ChainBehavior, ScriptedChain};
    use docchat_core::Role;
    use serde_json::json;

    fn session(mode: Mode) -> ChatSession {
        let mut session = ChatSession::new(Arc::new(StaticRetriever::default()));
        session.mode = mode;
        session
    }

    fn output(context: Option<Vec<Document>>, answer: Option<Answer>) -> ChainOutput {
        ChainOutput {
            input: "q".to_string(),
            chat_history: Vec::new(),
            context,
            answer,
        }
    }

    fn three_documents() -> Vec<Document> {
        vec![
            Document::new("a")
                .with_metadata("source", "docs/handbook.pdf")
                .with_metadata("page", 2),
            Document::new("b").with_metadata("file_path", "docs/faq.md"),
            Document::new("c"),
        ]
    }

    fn answering(documents: Vec<Document>, answer: &str) -> ScriptedChain {
        ScriptedChain::new(ChainBehavior::Output(output(
            Some(documents),
            Some(Answer::Text(answer.to_string())),
        )))
    }

    #[tokio::test]
    async fn test_document_search_payload() {
        let chain = answering(three_documents(), "The handbook covers onboarding.");
        let mut session = session(Mode::DocumentSearch);

        let payload = respond_with(&chain, &mut session, "onboarding?").await.unwrap();

        let hit = match payload {
            AssistantPayload::DocumentSearch(DocumentSearchPayload::Found(hit)) => hit,
            other => panic!("Expected document hit, got {:?}", other),
        };
        assert_eq!(hit.main_message, "The handbook covers onboarding.");
        assert_eq!(hit.main_file_path, "docs/handbook.pdf");
        assert_eq!(hit.main_page_number, Some(3));
        assert_eq!(hit.sub_message.as_deref(), Some(SUB_MESSAGE));
        assert_eq!(
            hit.sub_choices,
            vec![
                SourceCitation::new("docs/faq.md", None),
                SourceCitation::new(crate::citation::UNKNOWN_SOURCE, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_source_has_no_sub_choices() {
        let docs = vec![Document::new("a").with_metadata("source", "only.txt")];
        let chain = answering(docs, "answer");
        let mut session = session(Mode::DocumentSearch);

        let payload = respond_with(&chain, &mut session, "q").await.unwrap();

        match payload {
            AssistantPayload::DocumentSearch(DocumentSearchPayload::Found(hit)) => {
                assert_eq!(hit.main_file_path, "only.txt");
                assert_eq!(hit.main_page_number, None);
                assert!(hit.sub_choices.is_empty());
            }
            other => panic!("Expected document hit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inquiry_payload_lists_every_source_in_order() {
        let chain = answering(three_documents(), "Three steps.");
        let mut session = session(Mode::Inquiry);

        let payload = respond_with(&chain, &mut session, "how?").await.unwrap();

        let inquiry = match payload {
            AssistantPayload::Inquiry(inquiry) => inquiry,
            other => panic!("Expected inquiry, got {:?}", other),
        };
        assert_eq!(inquiry.answer, "Three steps.");
        assert_eq!(inquiry.message.as_deref(), Some(FILE_LIST_MESSAGE));
        assert_eq!(
            inquiry.file_info_list,
            Some(vec![
                FileInfo::Text("docs/handbook.pdf (p.3)".to_string()),
                FileInfo::Text("docs/faq.md".to_string()),
                FileInfo::Text(crate::citation::UNKNOWN_SOURCE.to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_history_records_both_messages_as_user() {
        let chain = answering(three_documents(), "answer text");
        let mut session = session(Mode::Inquiry);

        respond_with(&chain, &mut session, "question text").await.unwrap();

        assert_eq!(
            session.chat_history,
            vec![
                ChatMessage::user("question text"),
                ChatMessage::user("answer text"),
            ]
        );
        assert!(session.chat_history.iter().all(|m| m.role == Role::User));
    }

    #[tokio::test]
    async fn test_chain_receives_prior_history() {
        let chain = answering(three_documents(), "answer");
        let mut session = session(Mode::Inquiry);
        session.chat_history = vec![ChatMessage::user("earlier"), ChatMessage::user("reply")];

        respond_with(&chain, &mut session, "follow-up").await.unwrap();

        let invocations = chain.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].input, "follow-up");
        assert_eq!(invocations[0].chat_history.len(), 2);
    }

    #[tokio::test]
    async fn test_structured_answer_text_is_extracted() {
        let chain = ScriptedChain::new(ChainBehavior::Output(output(
            Some(three_documents()),
            Some(Answer::Structured(json!({"text": "structured answer"}))),
        )));
        let mut session = session(Mode::Inquiry);

        let payload = respond_with(&chain, &mut session, "q").await.unwrap();
        assert_eq!(payload.answer_text(), "structured answer");
    }

    #[tokio::test]
    async fn test_missing_answer_uses_fallback() {
        let chain = ScriptedChain::new(ChainBehavior::Output(output(Some(three_documents()), None)));
        let mut session = session(Mode::Inquiry);

        let payload = respond_with(&chain, &mut session, "q").await.unwrap();
        assert_eq!(payload.answer_text(), ANSWER_FALLBACK);
        assert_eq!(session.chat_history[1].content, ANSWER_FALLBACK);
    }

    #[tokio::test]
    async fn test_empty_context_is_no_relevant_documents() {
        let chain = answering(Vec::new(), "answer");
        let mut session = session(Mode::DocumentSearch);
        session.chat_history = vec![ChatMessage::user("kept")];

        let result = respond_with(&chain, &mut session, "q").await;

        assert!(matches!(result, Err(AppError::NoRelevantDocuments)));
        assert_eq!(session.chat_history, vec![ChatMessage::user("kept")]);
    }

    #[tokio::test]
    async fn test_missing_context_is_no_relevant_documents() {
        let chain = ScriptedChain::new(ChainBehavior::Output(output(
            None,
            Some(Answer::Text("answer".to_string())),
        )));
        let mut session = session(Mode::Inquiry);

        let result = respond_with(&chain, &mut session, "q").await;

        assert!(matches!(result, Err(AppError::NoRelevantDocuments)));
        assert!(session.chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_null_result_is_empty_chain_result() {
        let chain = ScriptedChain::new(ChainBehavior::Nothing);
        let mut session = session(Mode::Inquiry);

        let result = respond_with(&chain, &mut session, "q").await;

        assert!(matches!(result, Err(AppError::EmptyChainResult)));
        assert!(session.chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_chain_failure_leaves_history_untouched() {
        let chain = ScriptedChain::new(ChainBehavior::Fail("model offline".to_string()));
        let mut session = session(Mode::DocumentSearch);
        session.chat_history = vec![ChatMessage::user("a"), ChatMessage::user("b")];

        let result = respond_with(&chain, &mut session, "q").await;

        match result {
            Err(AppError::Chain(msg)) => assert!(msg.contains("model offline")),
            other => panic!("Expected chain error, got {:?}", other),
        }
        assert_eq!(session.chat_history.len(), 2);
    }

    #[tokio::test]
    async fn test_history_grows_by_two_per_exchange() {
        let chain = answering(three_documents(), "answer");
        let mut session = session(Mode::DocumentSearch);

        for n in 1..=4 {
            respond_with(&chain, &mut session, "q").await.unwrap();
            assert_eq!(session.chat_history.len(), 2 * n);
        }
    }

    #[test]
    fn test_shape_document_search_without_citations() {
        let payload = shape_payload(Mode::DocumentSearch, "plain".to_string(), Vec::new());
        assert_eq!(
            payload,
            AssistantPayload::DocumentSearch(DocumentSearchPayload::NoFileFound(NoFileFound::new(
                "plain"
            )))
        );
    }

    #[test]
    fn test_answer_template_depends_on_mode() {
        let orchestrator = ResponseOrchestrator::new(
            Arc::new(crate::tests::ScriptedLlm::new(Vec::new())),
            "m",
            0.5,
            PromptSet::default(),
        );

        let search = orchestrator.answer_template(Mode::DocumentSearch);
        let inquiry = orchestrator.answer_template(Mode::Inquiry);
        assert_ne!(search, inquiry);
        assert_eq!(
            orchestrator.query_rewrite_template().messages[0],
            docchat_prompt::TemplateMessage::System(PromptSet::default().query_rewrite)
        );
    }
}
