//! Neo4j backend (`bolt://`, `neo4j://` and their TLS variants).

use async_trait::async_trait;

use nsc_core::{
    ConsoleResult, CypherQuery, GraphNode, GraphPath, GraphRelationship, GraphStatistics, NodeId,
    Record,
};

use crate::client::GraphClient;
use crate::queries::{nodes, path, raw, relationships, stats};
use crate::store::GraphStore;

pub struct Neo4jGraphStore {
    client: GraphClient,
}

impl Neo4jGraphStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> ConsoleResult<Self> {
        Ok(Self {
            client: GraphClient::connect(uri, user, password).await?,
        })
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    fn name(&self) -> &'static str {
        "neo4j"
    }

    async fn ping(&self) -> ConsoleResult<()> {
        self.client.ping().await
    }

    async fn create_node(&self, labels: &[String], properties: &Record) -> ConsoleResult<GraphNode> {
        nodes::create_node(&self.client, labels, properties).await
    }

    async fn create_relationship(
        &self,
        rel_type: &str,
        source: NodeId,
        target: NodeId,
        properties: &Record,
    ) -> ConsoleResult<GraphRelationship> {
        relationships::create_relationship(&self.client, rel_type, source, target, properties).await
    }

    async fn find_nodes(
        &self,
        labels: &[String],
        properties: &Record,
        limit: usize,
    ) -> ConsoleResult<Vec<GraphNode>> {
        nodes::find_nodes(&self.client, labels, properties, limit).await
    }

    async fn find_relationships(
        &self,
        rel_type: Option<&str>,
        properties: &Record,
        limit: usize,
    ) -> ConsoleResult<Vec<GraphRelationship>> {
        relationships::find_relationships(&self.client, rel_type, properties, limit).await
    }

    async fn run_query(&self, query: &CypherQuery) -> ConsoleResult<Vec<Record>> {
        raw::run_query(&self.client, query).await
    }

    async fn shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        max_hops: usize,
    ) -> ConsoleResult<GraphPath> {
        path::shortest_path(&self.client, source, target, max_hops).await
    }

    async fn node(&self, id: NodeId) -> ConsoleResult<Option<GraphNode>> {
        nodes::get_node(&self.client, id).await
    }

    async fn statistics(&self) -> ConsoleResult<GraphStatistics> {
        stats::statistics(&self.client).await
    }

    async fn sample(&self, limit: usize) -> ConsoleResult<(Vec<GraphNode>, Vec<GraphRelationship>)> {
        let sampled = nodes::sample_nodes(&self.client, limit).await?;
        let ids: Vec<NodeId> = sampled.iter().map(|n| n.id).collect();
        let rels = relationships::relationships_among(&self.client, &ids).await?;
        Ok((sampled, rels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsc_core::ErrorKind;

    async fn live() -> Neo4jGraphStore {
        let var = |k: &str| std::env::var(k).unwrap();
        Neo4jGraphStore::connect(&var("NEO4J_URI"), &var("NEO4J_USER"), &var("NEO4J_PASSWORD"))
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a running Neo4j (NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD)"]
    async fn test_create_and_find_against_live_neo4j() {
        let store = live().await;
        let mut props = Record::new();
        props.insert("name".into(), "nsc-live-test".into());
        let labels = vec!["NscTest".to_string()];

        let node = store.create_node(&labels, &props).await.unwrap();
        let found = store.find_nodes(&labels, &props, 10).await.unwrap();
        assert!(found.iter().any(|n| n.id == node.id));

        store
            .run_query(&CypherQuery::new("MATCH (n:NscTest) DETACH DELETE n"))
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Neo4j (NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD)"]
    async fn test_syntax_error_is_classified() {
        let store = live().await;
        let err = store
            .run_query(&CypherQuery::new("MATCH (n RETURN n"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuerySyntaxError);
    }
}
