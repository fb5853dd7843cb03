//! Graph adapter behaviour against the in-memory backend.

use std::sync::Arc;

use nsc_core::{ErrorKind, FieldValue, NodeId, PolicyConfig, Record};
use nsc_graph::{GraphAdapter, MemoryGraphStore};

fn adapter() -> GraphAdapter {
    GraphAdapter::new(Arc::new(MemoryGraphStore::new()), PolicyConfig::default())
}

fn props(json: &str) -> Record {
    serde_json::from_str(json).unwrap()
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_relationship_to_missing_node_is_reference_error() {
    let adapter = adapter();
    let a = adapter.create_node(&labels(&["Person"]), &Record::new()).await.unwrap();

    let err = adapter
        .create_relationship("KNOWS", a.id, NodeId(999), &Record::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferenceError);
    assert!(err.message().contains("999"));

    let err = adapter
        .create_relationship("KNOWS", NodeId(-1), a.id, &Record::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferenceError);
}

#[tokio::test]
async fn test_path_to_self_is_single_node() {
    let adapter = adapter();
    let a = adapter.create_node(&labels(&["Person"]), &props(r#"{"name": "A"}"#)).await.unwrap();

    let path = adapter.shortest_path(a.id, a.id, None).await.unwrap();
    assert_eq!(path.nodes, vec![a]);
    assert!(path.relationships.is_empty());
}

#[tokio::test]
async fn test_disconnected_nodes_have_no_path() {
    let adapter = adapter();
    let a = adapter.create_node(&labels(&["N"]), &Record::new()).await.unwrap();
    let b = adapter.create_node(&labels(&["N"]), &Record::new()).await.unwrap();
    let c = adapter.create_node(&labels(&["N"]), &Record::new()).await.unwrap();
    adapter.create_relationship("R", a.id, b.id, &Record::new()).await.unwrap();

    assert!(adapter.shortest_path(a.id, c.id, None).await.unwrap().is_empty());
    assert!(adapter.shortest_path(a.id, NodeId(404), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chain_path_has_length_two() {
    let adapter = adapter();
    let a = adapter.create_node(&labels(&["N"]), &props(r#"{"name": "A"}"#)).await.unwrap();
    let b = adapter.create_node(&labels(&["N"]), &props(r#"{"name": "B"}"#)).await.unwrap();
    let c = adapter.create_node(&labels(&["N"]), &props(r#"{"name": "C"}"#)).await.unwrap();
    let ab = adapter.create_relationship("NEXT", a.id, b.id, &Record::new()).await.unwrap();
    let bc = adapter.create_relationship("NEXT", b.id, c.id, &Record::new()).await.unwrap();

    let path = adapter.shortest_path(a.id, c.id, None).await.unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path.nodes, vec![a, b, c]);
    assert_eq!(path.relationships, vec![ab, bc]);
}

#[tokio::test]
async fn test_created_node_is_found_by_label_and_property() {
    let adapter = adapter();
    let node = adapter
        .create_node(&labels(&["Person"]), &props(r#"{"name": "A"}"#))
        .await
        .unwrap();
    adapter.create_node(&labels(&["Person"]), &props(r#"{"name": "B"}"#)).await.unwrap();
    adapter.create_node(&labels(&["City"]), &props(r#"{"name": "A"}"#)).await.unwrap();

    let found = adapter
        .find_nodes(&labels(&["Person"]), &props(r#"{"name": "A"}"#))
        .await
        .unwrap();
    assert_eq!(found, vec![node]);
}

#[tokio::test]
async fn test_find_relationships_by_type_and_property() {
    let adapter = adapter();
    let a = adapter.create_node(&labels(&["P"]), &Record::new()).await.unwrap();
    let b = adapter.create_node(&labels(&["P"]), &Record::new()).await.unwrap();
    adapter
        .create_relationship("KNOWS", a.id, b.id, &props(r#"{"since": 2020}"#))
        .await
        .unwrap();
    adapter.create_relationship("LIKES", a.id, b.id, &Record::new()).await.unwrap();

    let knows = adapter.find_relationships(Some("KNOWS"), &Record::new()).await.unwrap();
    assert_eq!(knows.len(), 1);
    assert_eq!(knows[0].properties["since"], FieldValue::Int(2020));

    let all = adapter.find_relationships(Some(" "), &Record::new()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_statistics_distributions() {
    let adapter = adapter();
    let a = adapter.create_node(&labels(&["Person", "Admin"]), &Record::new()).await.unwrap();
    let b = adapter.create_node(&labels(&["Person"]), &Record::new()).await.unwrap();
    adapter.create_relationship("KNOWS", a.id, b.id, &Record::new()).await.unwrap();

    let stats = adapter.statistics().await.unwrap();
    assert_eq!(stats.node_count, 2);
    assert_eq!(stats.relationship_count, 1);
    assert_eq!(stats.label_counts["Person"], 2);
    assert_eq!(stats.label_counts["Admin"], 1);
    assert_eq!(stats.type_counts["KNOWS"], 1);
}

#[tokio::test]
async fn test_sample_is_clamped_to_view_range() {
    let adapter = adapter();
    for _ in 0..15 {
        adapter.create_node(&labels(&["N"]), &Record::new()).await.unwrap();
    }
    let (nodes, _) = adapter.sample(Some(1)).await.unwrap();
    assert_eq!(nodes.len(), 10);
}
