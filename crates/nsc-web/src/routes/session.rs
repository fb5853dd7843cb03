//! Session route handlers.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;

use nsc_core::{Panel, SessionContext};

use super::ApiJson;
use crate::error::ApiResult;
use crate::state::{session_id, AppState};

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub panel: String,
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionContext> {
    Json(state.session(&session_id(&headers)).await)
}

/// PUT /api/session/panel
pub async fn navigate(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<NavigateRequest>,
) -> ApiResult<Json<SessionContext>> {
    let panel: Panel = req.panel.parse()?;
    Ok(Json(state.navigate(&session_id(&headers), panel).await))
}
