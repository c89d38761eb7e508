//! Serve command handler.
//!
//! Runs the chat web UI over the configured document index.

use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_web::{start_server, AppState};
use std::path::PathBuf;
use std::time::Duration;

/// Run the chat web UI
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (default: 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default: 8501)
    #[arg(long)]
    pub port: Option<u16>,

    /// Document index to answer from (JSONL, one document per line)
    #[arg(short, long)]
    pub index: Option<PathBuf>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut config = config.clone();
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref index) = self.index {
            config.retrieval.index_path = Some(index.clone());
        }

        // Both are built once; a failure here stops startup
        let retriever = docchat_rag::load_retriever(&config)?;
        let orchestrator = docchat_rag::build_orchestrator(&config)?;

        let state = AppState::new(orchestrator, retriever)?
            .with_session_ttl(Duration::from_secs(config.server.session_ttl_secs));
        start_server(&config.server.bind_addr(), state).await
    }
}
