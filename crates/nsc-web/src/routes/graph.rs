//! Graph and visualization panel route handlers.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use nsc_core::render::{to_graph_payload, to_table, GraphPayload, Table};
use nsc_core::{
    ConsoleError, ConsoleResult, CypherQuery, GraphNode, GraphPath, GraphRelationship,
    GraphStatistics, NodeId, Panel, Record,
};

use super::ApiJson;
use crate::error::ApiResult;
use crate::state::{session_id, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeSearchRequest {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRelationshipRequest {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub properties: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipSearchRequest {
    #[serde(rename = "type", default)]
    pub rel_type: Option<String>,
    #[serde(default)]
    pub properties: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PathRequest {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub max_hops: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub rows: Vec<Record>,
    pub table: Table,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub found: bool,
    pub path: GraphPath,
    pub graph: GraphPayload,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub limit: usize,
    pub graph: GraphPayload,
}

async fn answer<Q: Serialize, R: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    panel: Panel,
    action: &str,
    request: &Q,
    outcome: ConsoleResult<R>,
) -> ApiResult<Json<R>> {
    state
        .remember(&session_id(headers), panel, action, request, &outcome)
        .await;
    Ok(Json(outcome?))
}

/// POST /api/graph/nodes
pub async fn create_node(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateNodeRequest>,
) -> ApiResult<Json<GraphNode>> {
    let outcome = async { state.graph()?.create_node(&req.labels, &req.properties).await }.await;
    answer(&state, &headers, Panel::Graph, "create_node", &req, outcome).await
}

/// POST /api/graph/nodes/search
pub async fn search_nodes(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<NodeSearchRequest>,
) -> ApiResult<Json<Vec<GraphNode>>> {
    let outcome = async { state.graph()?.find_nodes(&req.labels, &req.properties).await }.await;
    answer(&state, &headers, Panel::Graph, "find_nodes", &req, outcome).await
}

/// POST /api/graph/relationships
pub async fn create_relationship(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateRelationshipRequest>,
) -> ApiResult<Json<GraphRelationship>> {
    let outcome = async {
        state
            .graph()?
            .create_relationship(&req.rel_type, req.source, req.target, &req.properties)
            .await
    }
    .await;
    answer(&state, &headers, Panel::Graph, "create_relationship", &req, outcome).await
}

/// POST /api/graph/relationships/search
pub async fn search_relationships(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<RelationshipSearchRequest>,
) -> ApiResult<Json<Vec<GraphRelationship>>> {
    let outcome = async {
        state
            .graph()?
            .find_relationships(req.rel_type.as_deref(), &req.properties)
            .await
    }
    .await;
    answer(&state, &headers, Panel::Graph, "find_relationships", &req, outcome).await
}

/// POST /api/graph/query
pub async fn run_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CypherQuery>,
) -> ApiResult<Json<RowsResponse>> {
    let outcome = async {
        let rows = state.graph()?.run_query(&req).await?;
        let table = to_table(&rows);
        Ok::<_, ConsoleError>(RowsResponse { rows, table })
    }
    .await;
    answer(&state, &headers, Panel::Graph, "run_query", &req, outcome).await
}

/// POST /api/graph/path
pub async fn shortest_path(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PathRequest>,
) -> ApiResult<Json<PathResponse>> {
    let outcome = async {
        let path = state
            .graph()?
            .shortest_path(req.source, req.target, req.max_hops)
            .await?;
        let graph = to_graph_payload(&path.nodes, &path.relationships);
        Ok::<_, ConsoleError>(PathResponse {
            found: !path.is_empty(),
            path,
            graph,
        })
    }
    .await;
    answer(&state, &headers, Panel::Graph, "shortest_path", &req, outcome).await
}

/// GET /api/graph/stats
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<GraphStatistics>> {
    let outcome = async { state.graph()?.statistics().await }.await;
    answer(&state, &headers, Panel::Visualization, "statistics", &(), outcome).await
}

/// GET /api/graph/view?limit=N - Sampled node-link payload.
pub async fn view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ViewParams>,
) -> ApiResult<Json<ViewResponse>> {
    let outcome = async {
        let graph = state.graph()?;
        let limit = graph.policy().graph_view_limit(params.limit);
        let (nodes, relationships) = graph.sample(Some(limit)).await?;
        Ok::<_, ConsoleError>(ViewResponse {
            limit,
            graph: to_graph_payload(&nodes, &relationships),
        })
    }
    .await;
    answer(&state, &headers, Panel::Visualization, "view", &params, outcome).await
}
