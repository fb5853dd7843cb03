//! Node-link payload for the interactive graph view.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::graph::{GraphNode, GraphRelationship, NodeId, RelationshipId};
use crate::value::Record;

const NO_LABEL_GROUP: &str = "No Label";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadNode {
    pub id: NodeId,
    /// Caption drawn on the node.
    pub label: String,
    /// Colour group (first label).
    pub group: String,
    pub labels: Vec<String>,
    pub properties: Record,
    /// Hover text, one `key: value` per line.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadEdge {
    pub id: RelationshipId,
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
    pub properties: Record,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphPayload {
    pub nodes: Vec<PayloadNode>,
    pub edges: Vec<PayloadEdge>,
}

pub fn to_graph_payload(nodes: &[GraphNode], relationships: &[GraphRelationship]) -> GraphPayload {
    let mut seen = HashSet::new();
    let payload_nodes: Vec<PayloadNode> = nodes
        .iter()
        .filter(|n| seen.insert(n.id))
        .map(|node| PayloadNode {
            id: node.id,
            label: node
                .properties
                .values()
                .next()
                .map(|v| v.display_text())
                .unwrap_or_else(|| node.id.to_string()),
            group: node
                .labels
                .first()
                .cloned()
                .unwrap_or_else(|| NO_LABEL_GROUP.to_string()),
            labels: node.labels.clone(),
            properties: node.properties.clone(),
            title: hover_title(&node.properties),
        })
        .collect();

    let mut edges = Vec::with_capacity(relationships.len());
    for rel in relationships {
        if !seen.contains(&rel.source) || !seen.contains(&rel.target) {
            debug!(relationship = %rel.id, "Dropping edge with endpoint outside the view");
            continue;
        }
        edges.push(PayloadEdge {
            id: rel.id,
            from: rel.source,
            to: rel.target,
            label: rel.rel_type.clone(),
            properties: rel.properties.clone(),
            title: hover_title(&rel.properties),
        });
    }

    GraphPayload {
        nodes: payload_nodes,
        edges,
    }
}

fn hover_title(properties: &Record) -> String {
    properties
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v.display_text()))
        .collect::<Vec<_>>()
        .join("\n")
}
