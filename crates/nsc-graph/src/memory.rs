//! Process-local graph store (`memory://`).
//!
//! Ids are allocated from zero in creation order. Query text is not
//! executed here.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tokio::sync::RwLock;

use nsc_core::{
    ConsoleError, ConsoleResult, CypherQuery, GraphNode, GraphPath, GraphRelationship,
    GraphStatistics, NodeId, Record, RelationshipId,
};

use crate::store::GraphStore;

#[derive(Default)]
struct Graph {
    next_node: i64,
    next_relationship: i64,
    nodes: BTreeMap<NodeId, GraphNode>,
    relationships: BTreeMap<RelationshipId, GraphRelationship>,
}

fn properties_match(candidate: &Record, wanted: &Record) -> bool {
    wanted
        .iter()
        .all(|(k, v)| candidate.get(k).is_some_and(|c| c.loose_eq(v)))
}

impl Graph {
    /// Breadth-first search ignoring direction; relationships are tried in
    /// id order so results are deterministic.
    fn shortest_path(&self, source: NodeId, target: NodeId, max_hops: usize) -> GraphPath {
        let mut adjacency: HashMap<NodeId, Vec<(NodeId, RelationshipId)>> = HashMap::new();
        for rel in self.relationships.values() {
            adjacency.entry(rel.source).or_default().push((rel.target, rel.id));
            adjacency.entry(rel.target).or_default().push((rel.source, rel.id));
        }

        let mut previous: HashMap<NodeId, (NodeId, RelationshipId)> = HashMap::new();
        let mut visited = HashSet::from([source]);
        let mut queue = VecDeque::from([(source, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if current == target {
                break;
            }
            if depth == max_hops {
                continue;
            }
            for &(next, rel) in adjacency.get(&current).into_iter().flatten() {
                if visited.insert(next) {
                    previous.insert(next, (current, rel));
                    queue.push_back((next, depth + 1));
                }
            }
        }

        if !previous.contains_key(&target) {
            return GraphPath::default();
        }

        let mut node_ids = vec![target];
        let mut rel_ids = Vec::new();
        let mut cursor = target;
        while let Some(&(prev, rel)) = previous.get(&cursor) {
            node_ids.push(prev);
            rel_ids.push(rel);
            cursor = prev;
        }
        node_ids.reverse();
        rel_ids.reverse();

        GraphPath {
            nodes: node_ids.iter().map(|id| self.nodes[id].clone()).collect(),
            relationships: rel_ids
                .iter()
                .map(|id| self.relationships[id].clone())
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct MemoryGraphStore {
    graph: RwLock<Graph>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> ConsoleResult<()> {
        Ok(())
    }

    async fn create_node(&self, labels: &[String], properties: &Record) -> ConsoleResult<GraphNode> {
        let mut graph = self.graph.write().await;
        let id = NodeId(graph.next_node);
        graph.next_node += 1;
        let node = GraphNode {
            id,
            labels: labels.to_vec(),
            properties: properties.clone(),
        };
        graph.nodes.insert(id, node.clone());
        Ok(node)
    }

    async fn create_relationship(
        &self,
        rel_type: &str,
        source: NodeId,
        target: NodeId,
        properties: &Record,
    ) -> ConsoleResult<GraphRelationship> {
        let mut graph = self.graph.write().await;
        for endpoint in [source, target] {
            if !graph.nodes.contains_key(&endpoint) {
                return Err(ConsoleError::reference(format!("node {} does not exist", endpoint)));
            }
        }
        let id = RelationshipId(graph.next_relationship);
        graph.next_relationship += 1;
        let rel = GraphRelationship {
            id,
            rel_type: rel_type.to_string(),
            source,
            target,
            properties: properties.clone(),
        };
        graph.relationships.insert(id, rel.clone());
        Ok(rel)
    }

    async fn find_nodes(
        &self,
        labels: &[String],
        properties: &Record,
        limit: usize,
    ) -> ConsoleResult<Vec<GraphNode>> {
        let graph = self.graph.read().await;
        Ok(graph
            .nodes
            .values()
            .filter(|n| labels.iter().all(|l| n.has_label(l)))
            .filter(|n| properties_match(&n.properties, properties))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_relationships(
        &self,
        rel_type: Option<&str>,
        properties: &Record,
        limit: usize,
    ) -> ConsoleResult<Vec<GraphRelationship>> {
        let graph = self.graph.read().await;
        Ok(graph
            .relationships
            .values()
            .filter(|r| rel_type.map_or(true, |t| r.rel_type == t))
            .filter(|r| properties_match(&r.properties, properties))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn run_query(&self, _query: &CypherQuery) -> ConsoleResult<Vec<Record>> {
        Err(ConsoleError::store(
            "the in-memory graph store cannot execute query text",
        ))
    }

    async fn shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        max_hops: usize,
    ) -> ConsoleResult<GraphPath> {
        let graph = self.graph.read().await;
        if !graph.nodes.contains_key(&source) || !graph.nodes.contains_key(&target) {
            return Ok(GraphPath::default());
        }
        Ok(graph.shortest_path(source, target, max_hops))
    }

    async fn node(&self, id: NodeId) -> ConsoleResult<Option<GraphNode>> {
        Ok(self.graph.read().await.nodes.get(&id).cloned())
    }

    async fn statistics(&self) -> ConsoleResult<GraphStatistics> {
        let graph = self.graph.read().await;
        let mut stats = GraphStatistics {
            node_count: graph.nodes.len() as u64,
            relationship_count: graph.relationships.len() as u64,
            ..Default::default()
        };
        for label in graph.nodes.values().flat_map(|n| &n.labels) {
            *stats.label_counts.entry(label.clone()).or_default() += 1;
        }
        for rel in graph.relationships.values() {
            *stats.type_counts.entry(rel.rel_type.clone()).or_default() += 1;
        }
        Ok(stats)
    }

    async fn sample(&self, limit: usize) -> ConsoleResult<(Vec<GraphNode>, Vec<GraphRelationship>)> {
        let graph = self.graph.read().await;
        let nodes: Vec<GraphNode> = graph.nodes.values().take(limit).cloned().collect();
        let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
        let rels = graph
            .relationships
            .values()
            .filter(|r| ids.contains(&r.source) && ids.contains(&r.target))
            .cloned()
            .collect();
        Ok((nodes, rels))
    }
}
