//! Session model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConsoleError, ErrorKind};

/// The four views of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Home,
    Documents,
    Graph,
    Visualization,
}

impl Panel {
    pub const ALL: [Panel; 4] = [
        Panel::Home,
        Panel::Documents,
        Panel::Graph,
        Panel::Visualization,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Home => "Home",
            Panel::Documents => "Documents",
            Panel::Graph => "Graph",
            Panel::Visualization => "Visualization",
        }
    }
}

impl std::str::FromStr for Panel {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Panel::Home),
            "documents" => Ok(Panel::Documents),
            "graph" => Ok(Panel::Graph),
            "visualization" => Ok(Panel::Visualization),
            other => Err(ConsoleError::validation(format!("unknown panel '{}'", other))),
        }
    }
}

/// An error as shown inline on a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorView {
    pub kind: String,
    pub message: String,
}

impl From<&ConsoleError> for ErrorView {
    fn from(err: &ConsoleError) -> Self {
        Self {
            kind: err.kind().as_str().to_string(),
            message: err.message().to_string(),
        }
    }
}

impl ErrorView {
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind.as_str()
    }
}

/// Last request and its outcome on one panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelMemory {
    /// Operation name, e.g. `find` or `shortest_path`.
    pub action: Option<String>,
    pub query: Option<serde_json::Value>,
    pub result: Option<serde_json::Value>,
    pub error: Option<ErrorView>,
}

/// Per-session UI state. Lives only in process memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub current: Panel,
    pub panels: BTreeMap<Panel, PanelMemory>,
}
