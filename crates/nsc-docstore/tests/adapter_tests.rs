//! Document adapter behaviour against the in-memory backend.

use std::sync::Arc;

use nsc_core::{ErrorKind, FieldValue, Namespace, Record};
use nsc_docstore::backends::MemoryDocumentStore;
use nsc_docstore::DocumentAdapter;

fn record(json: &str) -> Record {
    serde_json::from_str(json).unwrap()
}

fn setup(page_size: usize) -> (DocumentAdapter, Namespace) {
    let store = Arc::new(MemoryDocumentStore::new());
    (DocumentAdapter::new(store, page_size), Namespace::new("shop", "people"))
}

#[tokio::test]
async fn test_zero_matches_update_and_delete_return_zero() {
    let (adapter, ns) = setup(100);
    adapter.insert(&ns, record(r#"{"name": "Alice"}"#)).await.unwrap();

    let nobody = record(r#"{"name": "Nobody"}"#);
    assert_eq!(adapter.update(&ns, &nobody, &record(r#"{"age": 1}"#)).await.unwrap(), 0);
    assert_eq!(adapter.delete(&ns, &nobody).await.unwrap(), 0);

    // Unknown collections behave the same.
    let empty = Namespace::new("shop", "ghosts");
    assert_eq!(adapter.update(&empty, &Record::new(), &record(r#"{"a": 1}"#)).await.unwrap(), 0);
    assert_eq!(adapter.delete(&empty, &Record::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_find_is_capped_by_page_size() {
    let (adapter, ns) = setup(5);
    for i in 0..12 {
        adapter
            .insert(&ns, record(&format!(r#"{{"n": {}}}"#, i)))
            .await
            .unwrap();
    }
    let page = adapter.find(&ns, &Record::new(), None).await.unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page[0]["n"], FieldValue::Int(0));
}

#[tokio::test]
async fn test_insert_then_find_by_generated_key() {
    let (adapter, ns) = setup(100);
    let supplied = record(r#"{"name": "Alice", "age": 30, "tags": ["a", "b"]}"#);
    let id = adapter.insert(&ns, supplied.clone()).await.unwrap();

    let mut filter = Record::new();
    filter.insert("_id".into(), id.clone().into());
    let found = adapter.find(&ns, &filter, None).await.unwrap();

    assert_eq!(found.len(), 1);
    for (key, value) in &supplied {
        assert_eq!(found[0].get(key), Some(value), "field {}", key);
    }
    assert_eq!(found[0]["_id"], FieldValue::String(id));
}

#[tokio::test]
async fn test_group_by_age_counts() {
    let (adapter, ns) = setup(100);
    adapter
        .insert(&ns, record(r#"{"name": "Alice", "age": 30}"#))
        .await
        .unwrap();

    let pipeline: Vec<Record> = serde_json::from_str(
        r#"[
            {"$group": {"_id": "$age", "count": {"$sum": 1}}},
            {"$project": {"_id": 0, "age": "$_id", "count": 1}}
        ]"#,
    )
    .unwrap();
    let groups = adapter.aggregate(&ns, &pipeline).await.unwrap();
    assert_eq!(groups, vec![record(r#"{"age": 30, "count": 1}"#)]);
}

#[tokio::test]
async fn test_update_counts_only_changed_records() {
    let (adapter, ns) = setup(100);
    adapter.insert(&ns, record(r#"{"city": "Lyon", "n": 1}"#)).await.unwrap();
    adapter.insert(&ns, record(r#"{"city": "Lyon", "n": 2}"#)).await.unwrap();
    adapter.insert(&ns, record(r#"{"city": "Paris", "n": 2}"#)).await.unwrap();

    let modified = adapter
        .update(&ns, &record(r#"{"city": "Lyon"}"#), &record(r#"{"n": 2}"#))
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let bumped = adapter
        .update(&ns, &record(r#"{"n": {"$gte": 2}}"#), &record(r#"{"$inc": {"n": 10}}"#))
        .await
        .unwrap();
    assert_eq!(bumped, 3);
}

#[tokio::test]
async fn test_delete_with_operator_filter() {
    let (adapter, ns) = setup(100);
    for age in [12, 17, 30, 45] {
        adapter
            .insert(&ns, record(&format!(r#"{{"age": {}}}"#, age)))
            .await
            .unwrap();
    }
    let removed = adapter
        .delete(&ns, &record(r#"{"age": {"$lt": 18}}"#))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(adapter.find(&ns, &Record::new(), None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_operator_is_store_error() {
    let (adapter, ns) = setup(100);
    adapter.insert(&ns, record(r#"{"age": 1}"#)).await.unwrap();
    let err = adapter
        .find(&ns, &record(r#"{"age": {"$bogus": 1}}"#), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreError);
}

#[tokio::test]
async fn test_mixed_patch_is_validation_error() {
    let (adapter, ns) = setup(100);
    let err = adapter
        .update(&ns, &Record::new(), &record(r#"{"$set": {"a": 1}, "b": 2}"#))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}
