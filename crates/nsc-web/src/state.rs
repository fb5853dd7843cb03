//! Application state.

use axum::http::HeaderMap;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use nsc_core::{ConsoleError, ConsoleResult, Panel, PolicyConfig, SessionContext};
use nsc_docstore::DocumentAdapter;
use nsc_graph::GraphAdapter;

/// Header naming the browser session; absent means the `default` session.
pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";
/// Sessions kept before the least recently touched one is dropped.
pub const MAX_SESSIONS: usize = 1024;

/// A store connection made at startup, or the reason it could not be made.
#[derive(Clone)]
pub enum Handle<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Handle<T> {
    pub fn from_result(result: ConsoleResult<T>) -> Self {
        match result {
            Ok(value) => Handle::Ready(value),
            Err(e) => Handle::Unavailable(e.message().to_string()),
        }
    }

    pub fn get(&self) -> ConsoleResult<&T> {
        match self {
            Handle::Ready(value) => Ok(value),
            Handle::Unavailable(message) => Err(ConsoleError::connection(message.clone())),
        }
    }
}

/// Session contexts ordered from least to most recently touched.
struct Sessions {
    contexts: IndexMap<String, SessionContext>,
    capacity: usize,
}

impl Sessions {
    fn new(capacity: usize) -> Self {
        Self {
            contexts: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, id: &str) -> Option<&SessionContext> {
        self.contexts.get(id)
    }

    /// Context for `id`, moved to the most recent slot.
    fn touch(&mut self, id: &str) -> &mut SessionContext {
        let ctx = self.contexts.shift_remove(id).unwrap_or_default();
        if self.contexts.len() >= self.capacity {
            self.contexts.shift_remove_index(0);
        }
        self.contexts.entry(id.to_string()).or_insert(ctx)
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<Handle<DocumentAdapter>>,
    pub graph: Arc<Handle<GraphAdapter>>,
    pub policy: PolicyConfig,
    sessions: Arc<RwLock<Sessions>>,
}

impl AppState {
    pub fn new(
        documents: Handle<DocumentAdapter>,
        graph: Handle<GraphAdapter>,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            documents: Arc::new(documents),
            graph: Arc::new(graph),
            policy,
            sessions: Arc::new(RwLock::new(Sessions::new(MAX_SESSIONS))),
        }
    }

    /// Keep at most `limit` sessions.
    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.sessions = Arc::new(RwLock::new(Sessions::new(limit)));
        self
    }

    pub fn documents(&self) -> ConsoleResult<&DocumentAdapter> {
        self.documents.get()
    }

    pub fn graph(&self) -> ConsoleResult<&GraphAdapter> {
        self.graph.get()
    }

    pub async fn session(&self, id: &str) -> SessionContext {
        self.sessions.read().await.get(id).cloned().unwrap_or_default()
    }

    /// Move session `id` to `panel`.
    pub async fn navigate(&self, id: &str, panel: Panel) -> SessionContext {
        let mut sessions = self.sessions.write().await;
        let ctx = sessions.touch(id);
        ctx.navigate(panel);
        ctx.clone()
    }

    /// Remember a request and its outcome on `panel` of session `id`.
    pub async fn remember<Q, R>(
        &self,
        id: &str,
        panel: Panel,
        action: &str,
        query: &Q,
        outcome: &ConsoleResult<R>,
    ) where
        Q: Serialize,
        R: Serialize,
    {
        let mut sessions = self.sessions.write().await;
        sessions.touch(id).record(panel, action, query, outcome);
    }
}

pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(limit: usize) -> AppState {
        AppState::new(
            Handle::Unavailable("offline".into()),
            Handle::Unavailable("offline".into()),
            PolicyConfig::default(),
        )
        .with_session_limit(limit)
    }

    #[tokio::test]
    async fn test_sessions_are_capped() {
        let state = state(2);
        state.navigate("a", Panel::Graph).await;
        state.navigate("b", Panel::Graph).await;
        state.navigate("c", Panel::Graph).await;

        assert_eq!(state.session("a").await.current, Panel::Home);
        assert_eq!(state.session("b").await.current, Panel::Graph);
        assert_eq!(state.session("c").await.current, Panel::Graph);
        assert_eq!(state.sessions.read().await.contexts.len(), 2);
    }

    #[tokio::test]
    async fn test_touch_refreshes_a_session() {
        let state = state(2);
        state.navigate("a", Panel::Graph).await;
        state.navigate("b", Panel::Documents).await;
        let outcome: ConsoleResult<()> = Ok(());
        state.remember("a", Panel::Graph, "stats", &(), &outcome).await;
        state.navigate("c", Panel::Visualization).await;

        assert_eq!(state.session("a").await.current, Panel::Graph);
        assert_eq!(state.session("b").await.current, Panel::Home);
    }

    #[test]
    fn test_session_id_defaults() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), DEFAULT_SESSION);
        headers.insert(SESSION_HEADER, " tab-1 ".parse().unwrap());
        assert_eq!(session_id(&headers), "tab-1");
    }
}
