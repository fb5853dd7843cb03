//! Dashboard route handler.
//!
//! Serves the embedded four-panel console page.

use axum::response::{Html, IntoResponse};

const DASHBOARD_HTML: &str = include_str!("../../../../assets/web/index.html");

/// GET / - Serve the console.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}
