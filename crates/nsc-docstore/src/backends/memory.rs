//! Process-local document store (`memory://`).
//!
//! Collections are insertion-ordered vectors evaluated with the in-process
//! matcher, update applier and pipeline. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use nsc_core::{ConsoleError, ConsoleResult, FieldValue, Namespace, Record};

use crate::matcher::matches;
use crate::pipeline::run_pipeline;
use crate::projection::apply_projection;
use crate::store::DocumentStore;
use crate::update::{apply_update, ID_FIELD};

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Namespace, Vec<Record>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Give `record` an `_id` (generated when absent), placed first.
pub(crate) fn with_id(mut record: Record) -> (String, Record) {
    let id = match record.shift_remove(ID_FIELD) {
        Some(value) if !value.is_null() => value,
        _ => FieldValue::String(uuid::Uuid::new_v4().simple().to_string()),
    };
    let key = id.display_text();
    let mut out = Record::with_capacity(record.len() + 1);
    out.insert(ID_FIELD.to_string(), id);
    out.extend(record);
    (key, out)
}

pub(crate) fn duplicate_key(ns: &Namespace, key: &str) -> ConsoleError {
    ConsoleError::store(format!(
        "E11000 duplicate key error collection: {} index: _id_ dup key: {{ _id: \"{}\" }}",
        ns, key
    ))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> ConsoleResult<()> {
        Ok(())
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Record,
        projection: Option<&Record>,
        limit: usize,
    ) -> ConsoleResult<Vec<Record>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(ns) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for record in records {
            if out.len() >= limit {
                break;
            }
            if matches(record, filter)? {
                out.push(match projection {
                    Some(p) => apply_projection(record, p)?,
                    None => record.clone(),
                });
            }
        }
        Ok(out)
    }

    async fn insert(&self, ns: &Namespace, record: Record) -> ConsoleResult<String> {
        let (key, record) = with_id(record);
        let mut collections = self.collections.write().await;
        let records = collections.entry(ns.clone()).or_default();
        if records.iter().any(|r| r.get(ID_FIELD) == record.get(ID_FIELD)) {
            return Err(duplicate_key(ns, &key));
        }
        records.push(record);
        debug!(namespace = %ns, id = %key, "Inserted document in memory store");
        Ok(key)
    }

    async fn update(&self, ns: &Namespace, filter: &Record, update: &Record) -> ConsoleResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(ns) else {
            return Ok(0);
        };
        // A failing update leaves the collection untouched.
        let mut staged = Vec::new();
        for (position, record) in records.iter().enumerate() {
            if matches(record, filter)? {
                let mut copy = record.clone();
                if apply_update(&mut copy, update)? {
                    staged.push((position, copy));
                }
            }
        }
        let modified = staged.len() as u64;
        for (position, copy) in staged {
            records[position] = copy;
        }
        Ok(modified)
    }

    async fn delete(&self, ns: &Namespace, filter: &Record) -> ConsoleResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(ns) else {
            return Ok(0);
        };
        let mut keep = Vec::with_capacity(records.len());
        for record in records.iter() {
            keep.push(!matches(record, filter)?);
        }
        let before = records.len();
        let mut flags = keep.into_iter();
        records.retain(|_| flags.next().unwrap_or(true));
        Ok((before - records.len()) as u64)
    }

    async fn aggregate(&self, ns: &Namespace, pipeline: &[Record]) -> ConsoleResult<Vec<Record>> {
        let records = self
            .collections
            .read()
            .await
            .get(ns)
            .cloned()
            .unwrap_or_default();
        run_pipeline(records, pipeline)
    }
}
