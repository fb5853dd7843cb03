//! Page controller: navigation between panels and per-panel memory.
//!
//! Any panel is reachable from any other. Each panel remembers only its last
//! query and its outcome.

pub mod model;

pub use model::{ErrorView, Panel, PanelMemory, SessionContext};

use serde::Serialize;
use tracing::debug;

use crate::error::ConsoleResult;

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `panel`; returns the panel left behind.
    pub fn navigate(&mut self, panel: Panel) -> Panel {
        let previous = std::mem::replace(&mut self.current, panel);
        debug!(from = ?previous, to = ?panel, "Panel navigation");
        previous
    }

    pub fn memory(&self, panel: Panel) -> Option<&PanelMemory> {
        self.panels.get(&panel)
    }

    /// Remember a request and its outcome on `panel`, replacing whatever
    /// was there.
    pub fn record<Q, R>(
        &mut self,
        panel: Panel,
        action: &str,
        query: &Q,
        outcome: &ConsoleResult<R>,
    ) where
        Q: Serialize,
        R: Serialize,
    {
        let memory = PanelMemory {
            action: Some(action.to_string()),
            query: serde_json::to_value(query).ok(),
            result: outcome
                .as_ref()
                .ok()
                .and_then(|r| serde_json::to_value(r).ok()),
            error: outcome.as_ref().err().map(ErrorView::from),
        };
        self.panels.insert(panel, memory);
    }

    /// Forget everything remembered on `panel`.
    pub fn clear(&mut self, panel: Panel) {
        self.panels.remove(&panel);
    }
}
