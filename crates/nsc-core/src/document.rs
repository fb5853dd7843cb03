//! Document-side request and outcome types.

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, ConsoleResult};
use crate::value::{FieldValue, Record};

/// Database name prefilled in the document panel.
pub const DEFAULT_DATABASE: &str = "sample_db";

/// Collection name prefilled in the document panel.
pub const DEFAULT_COLLECTION: &str = "sample_collection";

/// A `{database, collection}` pair selected in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if self.database.trim().is_empty() {
            return Err(ConsoleError::validation("database name is required"));
        }
        if self.collection.trim().is_empty() {
            return Err(ConsoleError::validation("collection name is required"));
        }
        Ok(())
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE, DEFAULT_COLLECTION)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Kind of document operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Find,
    Insert,
    Update,
    Delete,
}

/// A document operation as entered in the document panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub kind: OperationKind,
    #[serde(default)]
    pub filter: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Record>,
}

impl QuerySpec {
    pub fn find(filter: Record, projection: Option<Record>) -> Self {
        Self {
            kind: OperationKind::Find,
            filter,
            projection,
            update: None,
            document: None,
        }
    }

    pub fn insert(document: Record) -> Self {
        Self {
            kind: OperationKind::Insert,
            filter: Record::new(),
            projection: None,
            update: None,
            document: Some(document),
        }
    }

    pub fn update(filter: Record, patch: Record) -> Self {
        Self {
            kind: OperationKind::Update,
            filter,
            projection: None,
            update: Some(patch),
            document: None,
        }
    }

    pub fn delete(filter: Record) -> Self {
        Self {
            kind: OperationKind::Delete,
            filter,
            projection: None,
            update: None,
            document: None,
        }
    }

    /// Reject requests lacking the fields their operation requires.
    pub fn validate(&self) -> ConsoleResult<()> {
        match self.kind {
            OperationKind::Find | OperationKind::Delete => Ok(()),
            OperationKind::Insert => match &self.document {
                Some(doc) if !doc.is_empty() => Ok(()),
                _ => Err(ConsoleError::validation("document to insert is empty")),
            },
            OperationKind::Update => match &self.update {
                Some(patch) if !patch.is_empty() => {
                    update_document(patch).map(|_| ())
                }
                _ => Err(ConsoleError::validation("update document is empty")),
            },
        }
    }
}

/// Turn a UI patch into an update-operator document.
///
/// A patch made only of `$`-operators passes through; a plain patch is
/// wrapped in `$set`. Mixing both is rejected.
pub fn update_document(patch: &Record) -> ConsoleResult<Record> {
    let operators = patch.keys().filter(|k| k.starts_with('$')).count();
    if operators == patch.len() {
        Ok(patch.clone())
    } else if operators == 0 {
        let mut wrapped = Record::new();
        wrapped.insert("$set".to_string(), FieldValue::Map(patch.clone()));
        Ok(wrapped)
    } else {
        Err(ConsoleError::validation(
            "update document mixes operators and plain fields",
        ))
    }
}

/// Result of executing a [`QuerySpec`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    Records { records: Vec<Record> },
    Inserted { id: String },
    Modified { count: u64 },
    Deleted { count: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_insert_requires_document() {
        let err = QuerySpec::insert(Record::new()).validate().unwrap_err();
        assert!(err.message().contains("empty"));
        assert!(QuerySpec::insert(record(r#"{"name": "Alice"}"#)).validate().is_ok());
    }

    #[test]
    fn test_update_requires_patch() {
        let spec = QuerySpec::update(Record::new(), Record::new());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_plain_patch_is_wrapped_in_set() {
        let doc = update_document(&record(r#"{"age": 31}"#)).unwrap();
        assert_eq!(doc, record(r#"{"$set": {"age": 31}}"#));
    }

    #[test]
    fn test_operator_patch_passes_through() {
        let patch = record(r#"{"$inc": {"age": 1}}"#);
        assert_eq!(update_document(&patch).unwrap(), patch);
    }

    #[test]
    fn test_mixed_patch_rejected() {
        let patch = record(r#"{"$inc": {"age": 1}, "name": "Bob"}"#);
        assert!(update_document(&patch).is_err());
    }

    #[test]
    fn test_namespace_validation() {
        assert!(Namespace::default().validate().is_ok());
        assert!(Namespace::new("db", " ").validate().is_err());
    }

    #[test]
    fn test_query_spec_deserializes_from_ui_payload() {
        let spec: QuerySpec =
            serde_json::from_str(r#"{"kind": "delete", "filter": {"age": {"$lt": 18}}}"#).unwrap();
        assert_eq!(spec.kind, OperationKind::Delete);
        assert!(spec.projection.is_none());
    }
}
