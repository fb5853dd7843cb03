//! Node creation and lookup.

use neo4rs::{BoltType, Query};
use tracing::debug;

use nsc_core::{ConsoleError, ConsoleResult, GraphNode, NodeId, Record};

use super::{node_map, property_filter};
use crate::client::{column, GraphClient};
use crate::convert::{bind, to_bolt_map};
use crate::ident::label_clause;

pub async fn create_node(
    client: &GraphClient,
    labels: &[String],
    properties: &Record,
) -> ConsoleResult<GraphNode> {
    let cypher = format!(
        "CREATE (n{} $props) RETURN {} AS node",
        label_clause(labels)?,
        node_map("n")
    );
    debug!(cypher = %cypher, "create node");
    let query = Query::new(cypher).param("props", BoltType::Map(to_bolt_map(properties)));
    client
        .query_scalar(query, "node")
        .await?
        .ok_or_else(|| ConsoleError::store("CREATE returned no node"))
}

pub async fn find_nodes(
    client: &GraphClient,
    labels: &[String],
    properties: &Record,
    limit: usize,
) -> ConsoleResult<Vec<GraphNode>> {
    let (filter, params) = property_filter("n", properties)?;
    let cypher = format!(
        "MATCH (n{}) {} RETURN {} AS node LIMIT $limit",
        label_clause(labels)?,
        filter,
        node_map("n")
    );
    debug!(cypher = %cypher, "find nodes");
    let query = bind(Query::new(cypher), &params).param("limit", limit as i64);
    client
        .query(query)
        .await?
        .iter()
        .map(|row| column(row, "node"))
        .collect()
}

pub async fn get_node(client: &GraphClient, id: NodeId) -> ConsoleResult<Option<GraphNode>> {
    let query = Query::new(format!("MATCH (n) WHERE id(n) = $id RETURN {} AS node", node_map("n")))
        .param("id", id.0);
    client.query_scalar(query, "node").await
}

/// Up to `limit` nodes in store order.
pub async fn sample_nodes(client: &GraphClient, limit: usize) -> ConsoleResult<Vec<GraphNode>> {
    let query = Query::new(format!("MATCH (n) RETURN {} AS node LIMIT $limit", node_map("n")))
        .param("limit", limit as i64);
    client
        .query(query)
        .await?
        .iter()
        .map(|row| column(row, "node"))
        .collect()
}
