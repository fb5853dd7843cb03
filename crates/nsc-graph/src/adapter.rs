//! Graph query adapter.
//!
//! Validates names and property values, applies the page-size and hop
//! policies, and logs each operation before delegating to a [`GraphStore`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use nsc_core::{
    ConsoleError, ConsoleResult, CypherQuery, FieldValue, GraphNode, GraphPath,
    GraphRelationship, GraphStatistics, NodeId, PolicyConfig, Record,
};

use crate::ident::quoted;
use crate::store::GraphStore;

#[derive(Clone)]
pub struct GraphAdapter {
    store: Arc<dyn GraphStore>,
    policy: PolicyConfig,
}

fn logged<T>(op: &str, result: ConsoleResult<T>) -> ConsoleResult<T> {
    if let Err(e) = &result {
        warn!(operation = op, kind = %e.kind(), "{}", e.message());
    }
    result
}

fn clean_labels(labels: &[String]) -> ConsoleResult<Vec<String>> {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| quoted("label", l).map(|_| l.to_string()))
        .collect()
}

fn check_keys(properties: &Record) -> ConsoleResult<()> {
    for key in properties.keys() {
        quoted("property key", key)?;
    }
    Ok(())
}

/// Property values must be scalars or lists of scalars.
fn check_values(properties: &Record) -> ConsoleResult<()> {
    for (key, value) in properties {
        let storable = match value {
            FieldValue::Map(_) => false,
            FieldValue::List(items) => items.iter().all(FieldValue::is_scalar),
            _ => true,
        };
        if !storable {
            return Err(ConsoleError::validation(format!(
                "property '{}' must be a scalar or a list of scalars",
                key
            )));
        }
    }
    Ok(())
}

fn clean_type(rel_type: &str) -> ConsoleResult<String> {
    let rel_type = rel_type.trim();
    quoted("relationship type", rel_type)?;
    Ok(rel_type.to_string())
}

impl GraphAdapter {
    pub fn new(store: Arc<dyn GraphStore>, policy: PolicyConfig) -> Self {
        Self { store, policy }
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub async fn ping(&self) -> ConsoleResult<()> {
        self.store.ping().await
    }

    pub async fn create_node(&self, labels: &[String], properties: &Record) -> ConsoleResult<GraphNode> {
        let labels = clean_labels(labels)?;
        if labels.is_empty() {
            return Err(ConsoleError::validation("a node needs at least one label"));
        }
        check_keys(properties)?;
        check_values(properties)?;

        let result = self.store.create_node(&labels, properties).await;
        if let Ok(node) = &result {
            info!(id = %node.id, labels = ?node.labels, "Created node");
        }
        logged("create_node", result)
    }

    pub async fn create_relationship(
        &self,
        rel_type: &str,
        source: NodeId,
        target: NodeId,
        properties: &Record,
    ) -> ConsoleResult<GraphRelationship> {
        let rel_type = clean_type(rel_type)?;
        check_keys(properties)?;
        check_values(properties)?;

        for (role, id) in [("source", source), ("target", target)] {
            if self.store.node(id).await?.is_none() {
                return logged(
                    "create_relationship",
                    Err(ConsoleError::reference(format!("{} node {} does not exist", role, id))),
                );
            }
        }

        let result = self
            .store
            .create_relationship(&rel_type, source, target, properties)
            .await;
        if let Ok(rel) = &result {
            info!(id = %rel.id, rel_type = %rel.rel_type, source = %source, target = %target, "Created relationship");
        }
        logged("create_relationship", result)
    }

    /// Blank labels are ignored; no labels matches every node.
    pub async fn find_nodes(&self, labels: &[String], properties: &Record) -> ConsoleResult<Vec<GraphNode>> {
        let labels = clean_labels(labels)?;
        check_keys(properties)?;
        let result = self
            .store
            .find_nodes(&labels, properties, self.policy.page_size)
            .await;
        if let Ok(nodes) = &result {
            debug!(labels = ?labels, count = nodes.len(), "find nodes");
        }
        logged("find_nodes", result)
    }

    /// A blank type matches every relationship.
    pub async fn find_relationships(
        &self,
        rel_type: Option<&str>,
        properties: &Record,
    ) -> ConsoleResult<Vec<GraphRelationship>> {
        let rel_type = match rel_type.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Some(clean_type(t)?),
            None => None,
        };
        check_keys(properties)?;
        let result = self
            .store
            .find_relationships(rel_type.as_deref(), properties, self.policy.page_size)
            .await;
        if let Ok(rels) = &result {
            debug!(rel_type = ?rel_type, count = rels.len(), "find relationships");
        }
        logged("find_relationships", result)
    }

    pub async fn run_query(&self, query: &CypherQuery) -> ConsoleResult<Vec<Record>> {
        if query.text.trim().is_empty() {
            return Err(ConsoleError::validation("query text is empty"));
        }
        let result = self.store.run_query(query).await;
        if let Ok(rows) = &result {
            info!(rows = rows.len(), "Ran graph query");
        }
        logged("run_query", result)
    }

    /// `max_hops` defaults to and is capped by the configured limit. Zero hops
    /// only reach the source itself.
    pub async fn shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        max_hops: Option<usize>,
    ) -> ConsoleResult<GraphPath> {
        let limit = self.policy.max_path_hops;
        let hops = max_hops.unwrap_or(limit).min(limit);

        if source == target {
            let node = logged("shortest_path", self.store.node(source).await)?;
            return Ok(GraphPath {
                nodes: node.into_iter().collect(),
                relationships: Vec::new(),
            });
        }

        if hops == 0 {
            return Ok(GraphPath::default());
        }

        let result = self.store.shortest_path(source, target, hops).await;
        if let Ok(path) = &result {
            debug!(source = %source, target = %target, hops, length = path.len(), found = !path.is_empty(), "shortest path");
        }
        logged("shortest_path", result)
    }

    pub async fn statistics(&self) -> ConsoleResult<GraphStatistics> {
        logged("statistics", self.store.statistics().await)
    }

    /// Nodes and relationships for the graph view; `limit` is clamped to the
    /// view range.
    pub async fn sample(
        &self,
        limit: Option<usize>,
    ) -> ConsoleResult<(Vec<GraphNode>, Vec<GraphRelationship>)> {
        let limit = self.policy.graph_view_limit(limit);
        logged("sample", self.store.sample(limit).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraphStore;
    use nsc_core::ErrorKind;

    fn adapter() -> GraphAdapter {
        GraphAdapter::new(Arc::new(MemoryGraphStore::new()), PolicyConfig::default())
    }

    fn props(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_node_needs_a_label() {
        let err = adapter()
            .create_node(&[" ".to_string()], &Record::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_nested_property_rejected() {
        let err = adapter()
            .create_node(&["P".to_string()], &props(r#"{"address": {"city": "Lyon"}}"#))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(adapter()
            .create_node(&["P".to_string()], &props(r#"{"tags": ["a", 1]}"#))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_injection_in_type_rejected() {
        let adapter = adapter();
        let a = adapter.create_node(&["P".to_string()], &Record::new()).await.unwrap();
        let err = adapter
            .create_relationship("KNOWS]->() DETACH DELETE a //", a.id, a.id, &Record::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let err = adapter().run_query(&CypherQuery::new("  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_hops_are_clamped_to_policy() {
        let policy = PolicyConfig {
            max_path_hops: 1,
            ..PolicyConfig::default()
        };
        let adapter = GraphAdapter::new(Arc::new(MemoryGraphStore::new()), policy);
        let label = vec!["N".to_string()];
        let a = adapter.create_node(&label, &Record::new()).await.unwrap();
        let b = adapter.create_node(&label, &Record::new()).await.unwrap();
        let c = adapter.create_node(&label, &Record::new()).await.unwrap();
        adapter.create_relationship("R", a.id, b.id, &Record::new()).await.unwrap();
        adapter.create_relationship("R", b.id, c.id, &Record::new()).await.unwrap();

        let path = adapter.shortest_path(a.id, c.id, Some(10)).await.unwrap();
        assert!(path.is_empty());
    }

    #[tokio::test]
    async fn test_zero_hops_reach_only_the_source() {
        let adapter = adapter();
        let label = vec!["N".to_string()];
        let x = adapter.create_node(&label, &Record::new()).await.unwrap();
        let y = adapter.create_node(&label, &Record::new()).await.unwrap();
        adapter.create_relationship("R", x.id, y.id, &Record::new()).await.unwrap();

        let path = adapter.shortest_path(x.id, y.id, Some(0)).await.unwrap();
        assert!(path.is_empty());

        let path = adapter.shortest_path(x.id, x.id, Some(0)).await.unwrap();
        assert_eq!(path.nodes.len(), 1);

        let path = adapter.shortest_path(x.id, y.id, Some(1)).await.unwrap();
        assert_eq!(path.len(), 1);
    }
}
