//! Shortest path search.

use neo4rs::Query;
use tracing::debug;

use nsc_core::{ConsoleResult, GraphNode, GraphPath, GraphRelationship, NodeId};

use super::{node_map, relationship_map};
use crate::client::{column, GraphClient};

/// Undirected shortest path between two distinct nodes. The hop bound is
/// spliced as a literal since Cypher cannot parameterize it.
pub async fn shortest_path(
    client: &GraphClient,
    source: NodeId,
    target: NodeId,
    max_hops: usize,
) -> ConsoleResult<GraphPath> {
    let cypher = format!(
        "MATCH (a) WHERE id(a) = $source \
         MATCH (b) WHERE id(b) = $target \
         MATCH p = shortestPath((a)-[*..{}]-(b)) \
         RETURN [n IN nodes(p) | {}] AS nodes, \
                [r IN relationships(p) | {}] AS relationships \
         LIMIT 1",
        max_hops,
        node_map("n"),
        relationship_map("r")
    );
    debug!(cypher = %cypher, "shortest path");
    let query = Query::new(cypher)
        .param("source", source.0)
        .param("target", target.0);

    match client.query(query).await?.first() {
        Some(row) => Ok(GraphPath {
            nodes: column::<Vec<GraphNode>>(row, "nodes")?,
            relationships: column::<Vec<GraphRelationship>>(row, "relationships")?,
        }),
        None => Ok(GraphPath::default()),
    }
}
