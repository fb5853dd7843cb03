//! Graph-side entities.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::{FieldValue, Record};

/// Store-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

/// Store-assigned relationship identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub i64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Record,
}

impl GraphNode {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub id: RelationshipId,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub properties: Record,
}

/// One path: `nodes[i]` and `nodes[i + 1]` are joined by `relationships[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

impl GraphPath {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of relationships traversed.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_count: u64,
    pub relationship_count: u64,
    pub label_counts: BTreeMap<String, u64>,
    pub type_counts: BTreeMap<String, u64>,
}

/// Raw query-language text plus named parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CypherQuery {
    pub text: String,
    #[serde(default)]
    pub parameters: IndexMap<String, FieldValue>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: IndexMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}
