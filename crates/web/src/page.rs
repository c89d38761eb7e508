//! HTML rendering of the chat page.

use crate::view::{self, ChatBubble, ModeOption};
use docchat_core::{AppError, AppResult};
use docchat_rag::ChatSession;
use handlebars::Handlebars;
use serde::Serialize;

const PAGE_TEMPLATE_NAME: &str = "page";
const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");

/// Everything the page template needs.
#[derive(Debug, Serialize)]
pub struct PageView {
    pub title: &'static str,
    pub mode_label: &'static str,
    pub modes: Vec<ModeOption>,
    pub bubbles: Vec<ChatBubble>,
    pub error: Option<String>,
}

impl PageView {
    /// Greeting, then the session's conversation, then the error banner.
    pub fn for_session(session: &ChatSession, error: Option<String>) -> Self {
        let mut bubbles = vec![view::initial_greeting()];
        bubbles.extend(view::render_conversation(&session.messages));

        Self {
            title: view::APP_NAME,
            mode_label: view::MODE_LABEL,
            modes: view::mode_options(session.mode),
            bubbles,
            error,
        }
    }
}

/// Compiled page template.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
            .map_err(|e| AppError::Other(format!("Failed to register page template: {}", e)))?;

        Ok(Self { registry })
    }

    pub fn render(&self, page: &PageView) -> AppResult<String> {
        self.registry
            .render(PAGE_TEMPLATE_NAME, page)
            .map_err(|e| AppError::Other(format!("Failed to render page: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_rag::{AssistantPayload, InquiryPayload, Mode, StaticRetriever};
    use std::sync::Arc;

    fn session() -> ChatSession {
        ChatSession::new(Arc::new(StaticRetriever::default()))
    }

    #[test]
    fn test_empty_session_shows_greeting() {
        let html = PageRenderer::new()
            .unwrap()
            .render(&PageView::for_session(&session(), None))
            .unwrap();

        assert!(html.contains(view::APP_NAME));
        assert!(html.contains("Hello. I am a chatbot"));
        assert!(html.contains(r#"value="document_search" checked"#));
        assert!(!html.contains(r#"role="alert""#));
    }

    #[test]
    fn test_conversation_is_escaped() {
        let mut session = session();
        session.mode = Mode::Inquiry;
        session.record_turn(
            "<script>alert(1)</script>",
            AssistantPayload::Inquiry(InquiryPayload {
                answer: "Safe & sound".to_string(),
                message: None,
                file_info_list: None,
            }),
        );

        let html = PageRenderer::new()
            .unwrap()
            .render(&PageView::for_session(&session, None))
            .unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Safe &amp; sound"));
        assert!(html.contains(r#"value="inquiry" checked"#));
    }

    #[test]
    fn test_error_banner() {
        let html = PageRenderer::new()
            .unwrap()
            .render(&PageView::for_session(
                &session(),
                Some(view::build_error_message("Something broke.")),
            ))
            .unwrap();

        assert!(html.contains(r#"role="alert""#));
        assert!(html.contains("Something broke."));
        assert!(html.contains(view::COMMON_ERROR_MESSAGE));
    }
}
