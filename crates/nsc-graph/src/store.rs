//! The graph store vocabulary every backend implements.

use async_trait::async_trait;
use nsc_core::{
    ConsoleResult, CypherQuery, GraphNode, GraphPath, GraphRelationship, GraphStatistics, NodeId,
    Record,
};

/// A property graph store.
///
/// Labels, types and property keys reaching a backend have already been
/// validated as identifiers by the adapter.
#[async_trait]
pub trait GraphStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ping(&self) -> ConsoleResult<()>;

    async fn create_node(&self, labels: &[String], properties: &Record) -> ConsoleResult<GraphNode>;

    /// Fails with `ConsoleError::Reference` when either endpoint is missing.
    async fn create_relationship(
        &self,
        rel_type: &str,
        source: NodeId,
        target: NodeId,
        properties: &Record,
    ) -> ConsoleResult<GraphRelationship>;

    /// Nodes carrying every label in `labels` whose properties equal
    /// `properties`.
    async fn find_nodes(
        &self,
        labels: &[String],
        properties: &Record,
        limit: usize,
    ) -> ConsoleResult<Vec<GraphNode>>;

    async fn find_relationships(
        &self,
        rel_type: Option<&str>,
        properties: &Record,
        limit: usize,
    ) -> ConsoleResult<Vec<GraphRelationship>>;

    /// Pass-through query text; one record per result row.
    async fn run_query(&self, query: &CypherQuery) -> ConsoleResult<Vec<Record>>;

    /// Shortest undirected path of at most `max_hops` relationships between
    /// two distinct nodes; empty when none exists or an endpoint is missing.
    async fn shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        max_hops: usize,
    ) -> ConsoleResult<GraphPath>;

    async fn node(&self, id: NodeId) -> ConsoleResult<Option<GraphNode>>;

    async fn statistics(&self) -> ConsoleResult<GraphStatistics>;

    /// Up to `limit` nodes and every relationship between them.
    async fn sample(&self, limit: usize) -> ConsoleResult<(Vec<GraphNode>, Vec<GraphRelationship>)>;
}
