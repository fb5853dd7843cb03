//! Health route handler.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::{AppState, Handle};

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub documents: StoreHealth,
    pub graph: StoreHealth,
}

fn store_health<T>(handle: &Handle<T>, backend: impl Fn(&T) -> &'static str) -> StoreHealth {
    match handle {
        Handle::Ready(adapter) => StoreHealth {
            status: "ready",
            backend: Some(backend(adapter)),
            error: None,
        },
        Handle::Unavailable(message) => StoreHealth {
            status: "unavailable",
            backend: None,
            error: Some(message.clone()),
        },
    }
}

/// GET /health - Connection status of both stores. Always 200; a failed
/// store degrades the status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let documents = store_health(&state.documents, |a| a.backend());
    let graph = store_health(&state.graph, |a| a.backend());
    let status = if documents.error.is_none() && graph.error.is_none() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        documents,
        graph,
    })
}
