//! Document query adapter.
//!
//! Validates requests, applies the page-size policy and logs every
//! operation before delegating to the configured [`DocumentStore`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use nsc_core::document::update_document;
use nsc_core::{
    ConsoleError, ConsoleResult, Namespace, OperationKind, QueryOutcome, QuerySpec, Record,
};

use crate::store::DocumentStore;

#[derive(Clone)]
pub struct DocumentAdapter {
    store: Arc<dyn DocumentStore>,
    page_size: usize,
}

fn logged<T>(op: &str, ns: &Namespace, result: ConsoleResult<T>) -> ConsoleResult<T> {
    if let Err(e) = &result {
        warn!(operation = op, namespace = %ns, kind = %e.kind(), "{}", e.message());
    }
    result
}

impl DocumentAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn ping(&self) -> ConsoleResult<()> {
        self.store.ping().await
    }

    /// Records matching `filter`, at most one page.
    pub async fn find(
        &self,
        ns: &Namespace,
        filter: &Record,
        projection: Option<&Record>,
    ) -> ConsoleResult<Vec<Record>> {
        ns.validate()?;
        let result = self
            .store
            .find(ns, filter, projection, self.page_size)
            .await;
        if let Ok(records) = &result {
            debug!(namespace = %ns, count = records.len(), "find");
        }
        logged("find", ns, result)
    }

    /// Insert one record and return its generated (or supplied) key.
    pub async fn insert(&self, ns: &Namespace, record: Record) -> ConsoleResult<String> {
        ns.validate()?;
        if record.is_empty() {
            return Err(ConsoleError::validation("document to insert is empty"));
        }
        let result = self.store.insert(ns, record).await;
        if let Ok(id) = &result {
            info!(namespace = %ns, id = %id, "Inserted document");
        }
        logged("insert", ns, result)
    }

    /// Update every match of `filter` with `patch`; plain patches are
    /// wrapped in `$set`.
    pub async fn update(&self, ns: &Namespace, filter: &Record, patch: &Record) -> ConsoleResult<u64> {
        ns.validate()?;
        if patch.is_empty() {
            return Err(ConsoleError::validation("update document is empty"));
        }
        let update = update_document(patch)?;
        let result = self.store.update(ns, filter, &update).await;
        if let Ok(count) = &result {
            info!(namespace = %ns, modified = count, "Updated documents");
        }
        logged("update", ns, result)
    }

    pub async fn delete(&self, ns: &Namespace, filter: &Record) -> ConsoleResult<u64> {
        ns.validate()?;
        let result = self.store.delete(ns, filter).await;
        if let Ok(count) = &result {
            info!(namespace = %ns, deleted = count, "Deleted documents");
        }
        logged("delete", ns, result)
    }

    /// Run `pipeline` verbatim. Only emptiness is checked here.
    pub async fn aggregate(&self, ns: &Namespace, pipeline: &[Record]) -> ConsoleResult<Vec<Record>> {
        ns.validate()?;
        if pipeline.is_empty() {
            return Err(ConsoleError::validation("aggregation pipeline is empty"));
        }
        let result = self.store.aggregate(ns, pipeline).await;
        if let Ok(records) = &result {
            debug!(namespace = %ns, stages = pipeline.len(), count = records.len(), "aggregate");
        }
        logged("aggregate", ns, result)
    }

    /// Dispatch a panel request on its operation kind.
    pub async fn execute(&self, ns: &Namespace, spec: &QuerySpec) -> ConsoleResult<QueryOutcome> {
        spec.validate()?;
        match spec.kind {
            OperationKind::Find => {
                let records = self.find(ns, &spec.filter, spec.projection.as_ref()).await?;
                Ok(QueryOutcome::Records { records })
            }
            OperationKind::Insert => {
                let document = spec.document.clone().unwrap_or_default();
                let id = self.insert(ns, document).await?;
                Ok(QueryOutcome::Inserted { id })
            }
            OperationKind::Update => {
                let patch = spec.update.clone().unwrap_or_default();
                let count = self.update(ns, &spec.filter, &patch).await?;
                Ok(QueryOutcome::Modified { count })
            }
            OperationKind::Delete => {
                let count = self.delete(ns, &spec.filter).await?;
                Ok(QueryOutcome::Deleted { count })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryDocumentStore;
    use nsc_core::ErrorKind;

    fn adapter(page_size: usize) -> DocumentAdapter {
        DocumentAdapter::new(Arc::new(MemoryDocumentStore::new()), page_size)
    }

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_empty_insert_is_validation_error() {
        let err = adapter(10)
            .insert(&Namespace::default(), Record::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_empty_pipeline_is_validation_error() {
        let err = adapter(10)
            .aggregate(&Namespace::default(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_blank_namespace_rejected() {
        let err = adapter(10)
            .find(&Namespace::new("", "c"), &Record::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_execute_dispatches_on_kind() {
        let adapter = adapter(10);
        let ns = Namespace::default();

        let outcome = adapter
            .execute(&ns, &QuerySpec::insert(record(r#"{"_id": "a", "n": 1}"#)))
            .await
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Inserted { id: "a".into() });

        let outcome = adapter
            .execute(&ns, &QuerySpec::update(record(r#"{"_id": "a"}"#), record(r#"{"n": 2}"#)))
            .await
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Modified { count: 1 });

        let outcome = adapter
            .execute(&ns, &QuerySpec::find(Record::new(), None))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Records { records: vec![record(r#"{"_id": "a", "n": 2}"#)] }
        );

        let outcome = adapter
            .execute(&ns, &QuerySpec::delete(Record::new()))
            .await
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Deleted { count: 1 });
    }
}
