//! Relationship creation and lookup.

use neo4rs::{BoltType, Query};
use tracing::debug;

use nsc_core::{ConsoleError, ConsoleResult, FieldValue, GraphRelationship, NodeId, Record};

use super::{property_filter, relationship_map};
use crate::client::{column, GraphClient};
use crate::convert::{bind, to_bolt, to_bolt_map};
use crate::ident::quoted;

pub async fn create_relationship(
    client: &GraphClient,
    rel_type: &str,
    source: NodeId,
    target: NodeId,
    properties: &Record,
) -> ConsoleResult<GraphRelationship> {
    let cypher = format!(
        "MATCH (a) WHERE id(a) = $source \
         MATCH (b) WHERE id(b) = $target \
         CREATE (a)-[r:{} $props]->(b) \
         RETURN {} AS relationship",
        quoted("relationship type", rel_type)?,
        relationship_map("r")
    );
    debug!(cypher = %cypher, "create relationship");
    let query = Query::new(cypher)
        .param("source", source.0)
        .param("target", target.0)
        .param("props", BoltType::Map(to_bolt_map(properties)));
    client
        .query_scalar(query, "relationship")
        .await?
        .ok_or_else(|| {
            ConsoleError::reference(format!("node {} or node {} does not exist", source, target))
        })
}

pub async fn find_relationships(
    client: &GraphClient,
    rel_type: Option<&str>,
    properties: &Record,
    limit: usize,
) -> ConsoleResult<Vec<GraphRelationship>> {
    let type_clause = match rel_type {
        Some(t) => format!(":{}", quoted("relationship type", t)?),
        None => String::new(),
    };
    let (filter, params) = property_filter("r", properties)?;
    let cypher = format!(
        "MATCH ()-[r{}]->() {} RETURN {} AS relationship LIMIT $limit",
        type_clause,
        filter,
        relationship_map("r")
    );
    debug!(cypher = %cypher, "find relationships");
    let query = bind(Query::new(cypher), &params).param("limit", limit as i64);
    client
        .query(query)
        .await?
        .iter()
        .map(|row| column(row, "relationship"))
        .collect()
}

/// Every relationship whose endpoints are both in `ids`.
pub async fn relationships_among(
    client: &GraphClient,
    ids: &[NodeId],
) -> ConsoleResult<Vec<GraphRelationship>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids = FieldValue::List(ids.iter().map(|id| FieldValue::Int(id.0)).collect());
    let query = Query::new(format!(
        "MATCH (a)-[r]->(b) WHERE id(a) IN $ids AND id(b) IN $ids RETURN {} AS relationship",
        relationship_map("r")
    ))
    .param("ids", to_bolt(&ids));
    client
        .query(query)
        .await?
        .iter()
        .map(|row| column(row, "relationship"))
        .collect()
}
