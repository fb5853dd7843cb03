//! Document panel route handlers.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use nsc_core::render::{to_chart_series, to_table, ChartKind, ChartSeries, Table};
use nsc_core::{ConsoleError, ConsoleResult, Namespace, Panel, Record};

use super::{ApiJson, Remembered};
use crate::error::ApiResult;
use crate::state::{session_id, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct FindRequest {
    #[serde(default)]
    pub filter: Record,
    #[serde(default)]
    pub projection: Option<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsertRequest {
    pub document: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub filter: Record,
    pub update: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub filter: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub pipeline: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    pub filter: Record,
    pub x_field: String,
    pub y_field: String,
    pub kind: ChartKind,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub records: Vec<Record>,
    pub table: Table,
}

impl From<Vec<Record>> for RecordsResponse {
    fn from(records: Vec<Record>) -> Self {
        let table = to_table(&records);
        Self { records, table }
    }
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Remember the exchange on `panel`, then hand the outcome to axum.
async fn answer<Q: Serialize, R: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    panel: Panel,
    action: &str,
    scope: (&Namespace, &Q),
    outcome: ConsoleResult<R>,
) -> ApiResult<Json<R>> {
    let (namespace, request) = scope;
    let remembered = Remembered {
        scope: namespace,
        request,
    };
    state
        .remember(&session_id(headers), panel, action, &remembered, &outcome)
        .await;
    Ok(Json(outcome?))
}

/// POST /api/documents/{db}/{coll}/find
pub async fn find(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<FindRequest>,
) -> ApiResult<Json<RecordsResponse>> {
    let ns = Namespace::new(db, coll);
    let outcome = async {
        let records = state
            .documents()?
            .find(&ns, &req.filter, req.projection.as_ref())
            .await?;
        Ok::<_, ConsoleError>(RecordsResponse::from(records))
    }
    .await;
    answer(&state, &headers, Panel::Documents, "find", (&ns, &req), outcome).await
}

/// POST /api/documents/{db}/{coll}/insert
pub async fn insert(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<InsertRequest>,
) -> ApiResult<Json<InsertResponse>> {
    let ns = Namespace::new(db, coll);
    let outcome = async {
        let id = state.documents()?.insert(&ns, req.document.clone()).await?;
        Ok::<_, ConsoleError>(InsertResponse { id })
    }
    .await;
    answer(&state, &headers, Panel::Documents, "insert", (&ns, &req), outcome).await
}

/// POST /api/documents/{db}/{coll}/update
pub async fn update(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<UpdateRequest>,
) -> ApiResult<Json<CountResponse>> {
    let ns = Namespace::new(db, coll);
    let outcome = async {
        let count = state
            .documents()?
            .update(&ns, &req.filter, &req.update)
            .await?;
        Ok::<_, ConsoleError>(CountResponse { count })
    }
    .await;
    answer(&state, &headers, Panel::Documents, "update", (&ns, &req), outcome).await
}

/// POST /api/documents/{db}/{coll}/delete
pub async fn delete(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<DeleteRequest>,
) -> ApiResult<Json<CountResponse>> {
    let ns = Namespace::new(db, coll);
    let outcome = async {
        let count = state.documents()?.delete(&ns, &req.filter).await?;
        Ok::<_, ConsoleError>(CountResponse { count })
    }
    .await;
    answer(&state, &headers, Panel::Documents, "delete", (&ns, &req), outcome).await
}

/// POST /api/documents/{db}/{coll}/aggregate
pub async fn aggregate(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<AggregateRequest>,
) -> ApiResult<Json<RecordsResponse>> {
    let ns = Namespace::new(db, coll);
    let outcome = async {
        let records = state.documents()?.aggregate(&ns, &req.pipeline).await?;
        Ok::<_, ConsoleError>(RecordsResponse::from(records))
    }
    .await;
    answer(&state, &headers, Panel::Documents, "aggregate", (&ns, &req), outcome).await
}

/// POST /api/documents/{db}/{coll}/chart - Find, then plot one field
/// against another.
pub async fn chart(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<ChartRequest>,
) -> ApiResult<Json<ChartSeries>> {
    let ns = Namespace::new(db, coll);
    let outcome: ConsoleResult<ChartSeries> = async {
        let records = state.documents()?.find(&ns, &req.filter, None).await?;
        to_chart_series(&records, &req.x_field, &req.y_field, req.kind)
    }
    .await;
    answer(&state, &headers, Panel::Visualization, "chart", (&ns, &req), outcome).await
}
