//! Application state shared across all route handlers.
//!
//! AppState holds the orchestrator, the shared retriever, the compiled page
//! template and the in-memory session map. It is passed to handlers via
//! axum's State extractor.

use crate::page::PageRenderer;
use docchat_core::config::DEFAULT_SESSION_TTL_SECS;
use docchat_core::AppResult;
use docchat_rag::{ChatSession, ResponseOrchestrator, Retriever};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A session, serialized by its own async lock for the length of a turn.
pub type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

/// A stored session and the last time a request touched it.
struct SessionEntry {
    session: SharedSession,
    last_access: Instant,
}

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The session
/// map lock is only held to look up or insert an entry, never across an
/// `.await`.
#[derive(Clone)]
pub struct AppState {
    /// Answers user messages.
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Retriever handed to every new session.
    pub retriever: Arc<dyn Retriever>,
    /// Compiled page template.
    pub pages: Arc<PageRenderer>,
    /// Sessions keyed by the session cookie.
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    /// Idle time after which a session is evicted.
    session_ttl: Duration,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        orchestrator: ResponseOrchestrator,
        retriever: Arc<dyn Retriever>,
    ) -> AppResult<Self> {
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            retriever,
            pages: Arc::new(PageRenderer::new()?),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            start_time: Instant::now(),
        })
    }

    /// Set the idle time after which a session is evicted.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// An empty session that is never stored.
    pub fn transient_session(&self) -> ChatSession {
        ChatSession::new(self.retriever.clone())
    }

    /// Look up a session, creating an empty one on first use.
    ///
    /// Only handlers that change the session call this. Idle sessions are
    /// evicted on the way in.
    pub fn session(&self, id: Uuid) -> SharedSession {
        let now = Instant::now();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        evict_idle(&mut sessions, now, self.session_ttl);

        let entry = sessions.entry(id).or_insert_with(|| {
            tracing::debug!("Starting session {}", id);
            SessionEntry {
                session: Arc::new(tokio::sync::Mutex::new(ChatSession::new(
                    self.retriever.clone(),
                ))),
                last_access: now,
            }
        });
        entry.last_access = now;
        entry.session.clone()
    }

    /// Look up a stored session without creating one.
    pub fn existing_session(&self, id: Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        evict_idle(&mut sessions, now, self.session_ttl);

        sessions.get_mut(&id).map(|entry| {
            entry.last_access = now;
            entry.session.clone()
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

/// Drop every session idle for longer than `ttl` as of `now`.
fn evict_idle(sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant, ttl: Duration) {
    let before = sessions.len();
    sessions.retain(|_, entry| now.saturating_duration_since(entry.last_access) <= ttl);

    let evicted = before - sessions.len();
    if evicted > 0 {
        tracing::debug!("Evicted {} idle sessions", evicted);
    }
}
