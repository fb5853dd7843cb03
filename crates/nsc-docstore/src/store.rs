//! The document store vocabulary every backend implements.

use async_trait::async_trait;
use nsc_core::{ConsoleResult, Namespace, Record};

/// A document-oriented store addressed by `{database, collection}`.
///
/// Filters, projections, update documents and pipeline stages use the
/// MongoDB query vocabulary. Backends report failures as
/// `ConsoleError::Store` carrying the store's own message.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and `/health`.
    fn name(&self) -> &'static str;

    /// Cheap round-trip proving the store is reachable.
    async fn ping(&self) -> ConsoleResult<()>;

    /// At most `limit` records matching `filter`, in store order.
    async fn find(
        &self,
        ns: &Namespace,
        filter: &Record,
        projection: Option<&Record>,
        limit: usize,
    ) -> ConsoleResult<Vec<Record>>;

    /// Insert one record and return its key.
    async fn insert(&self, ns: &Namespace, record: Record) -> ConsoleResult<String>;

    /// Apply an update-operator document to every match; returns how many
    /// records actually changed.
    async fn update(&self, ns: &Namespace, filter: &Record, update: &Record) -> ConsoleResult<u64>;

    /// Remove every match; returns how many were removed.
    async fn delete(&self, ns: &Namespace, filter: &Record) -> ConsoleResult<u64>;

    /// Run aggregation stages verbatim.
    async fn aggregate(&self, ns: &Namespace, pipeline: &[Record]) -> ConsoleResult<Vec<Record>>;
}
