//! Ask command handler.
//!
//! Runs a single orchestrated turn against the document index and prints
//! the answer the way the chat page would show it.

use clap::Args;
use docchat_core::{config::AppConfig, AppError, AppResult};
use docchat_rag::{AssistantPayload, ChatSession, Mode};
use docchat_web::view::{self, Widget};
use std::path::PathBuf;

/// Ask a question about the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Answer mode (document_search, inquiry)
    #[arg(long, default_value = "document_search")]
    pub mode: Mode,

    /// Document index to answer from (JSONL, one document per line)
    #[arg(short, long)]
    pub index: Option<PathBuf>,

    /// Output the payload as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let mut config = config.clone();
        if let Some(ref index) = self.index {
            config.retrieval.index_path = Some(index.clone());
        }

        let retriever = docchat_rag::load_retriever(&config)?;
        let orchestrator = docchat_rag::build_orchestrator(&config)?;

        let mut session = ChatSession::new(retriever);
        session.mode = self.mode;

        let payload = orchestrator.respond(&mut session, question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            println!("{}", render_text(&payload));
        }

        Ok(())
    }
}

/// Plain-text rendering of an answer's widgets.
fn render_text(payload: &AssistantPayload) -> String {
    view::render_payload(payload)
        .iter()
        .map(|widget| match widget {
            Widget::Markdown { text } => text.clone(),
            Widget::Success { text, icon } | Widget::Info { text, icon } => {
                format!("{} {}", icon, text)
            }
            Widget::Warning { text } => format!("⚠️ {}", text),
            Widget::Divider => "---".to_string(),
            Widget::Heading { text } => format!("##### {}", text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
