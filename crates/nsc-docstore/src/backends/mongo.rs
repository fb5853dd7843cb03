//! MongoDB backend (`mongodb://`, `mongodb+srv://`).

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection};
use tracing::{debug, info};

use nsc_core::config::redact_uri;
use nsc_core::{ConsoleError, ConsoleResult, FieldValue, Namespace, Record};

use crate::store::DocumentStore;
use crate::update::ID_FIELD;

pub struct MongoDocumentStore {
    client: Client,
}

impl MongoDocumentStore {
    /// Build a client. The driver connects lazily; call `ping` to force a
    /// round-trip.
    pub async fn connect(uri: &str) -> ConsoleResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(|e| {
            ConsoleError::connection(format!(
                "cannot connect to MongoDB at {}: {}",
                redact_uri(uri),
                e
            ))
        })?;
        info!(uri = %redact_uri(uri), "MongoDB client created");
        Ok(Self { client })
    }

    fn collection(&self, ns: &Namespace) -> Collection<Document> {
        self.client.database(&ns.database).collection(&ns.collection)
    }
}

/// Surface the server's own message where there is one.
fn store_error(err: mongodb::error::Error) -> ConsoleError {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => ConsoleError::store(command.message.clone()),
        _ => ConsoleError::store(err.to_string()),
    }
}

pub fn to_bson(value: &FieldValue) -> Bson {
    match value {
        FieldValue::Null => Bson::Null,
        FieldValue::Bool(b) => Bson::Boolean(*b),
        FieldValue::Int(i) => i32::try_from(*i).map(Bson::Int32).unwrap_or(Bson::Int64(*i)),
        FieldValue::Float(f) => Bson::Double(*f),
        FieldValue::String(s) => Bson::String(s.clone()),
        FieldValue::List(items) => Bson::Array(items.iter().map(to_bson).collect()),
        FieldValue::Map(map) => Bson::Document(to_document(map)),
    }
}

pub fn to_document(record: &Record) -> Document {
    record.iter().map(|(k, v)| (k.clone(), to_bson(v))).collect()
}

/// Store-specific types without a JSON counterpart (ObjectId, dates,
/// decimals, ...) come back as strings.
pub fn from_bson(value: Bson) -> FieldValue {
    match value {
        Bson::Null | Bson::Undefined => FieldValue::Null,
        Bson::Boolean(b) => FieldValue::Bool(b),
        Bson::Int32(i) => FieldValue::Int(i as i64),
        Bson::Int64(i) => FieldValue::Int(i),
        Bson::Double(f) => FieldValue::Float(f),
        Bson::String(s) | Bson::Symbol(s) => FieldValue::String(s),
        Bson::Array(items) => FieldValue::List(items.into_iter().map(from_bson).collect()),
        Bson::Document(doc) => FieldValue::Map(from_document(doc)),
        Bson::ObjectId(oid) => FieldValue::String(oid.to_hex()),
        Bson::DateTime(dt) => FieldValue::String(
            dt.try_to_rfc3339_string().unwrap_or_else(|_| dt.to_string()),
        ),
        other => FieldValue::String(other.to_string()),
    }
}

pub fn from_document(doc: Document) -> Record {
    doc.into_iter().map(|(k, v)| (k, from_bson(v))).collect()
}

/// Turn 24-hex `_id` strings in a filter into ObjectIds so generated keys
/// round-trip through `find`.
pub fn coerce_object_ids(filter: &mut Document) {
    if let Some(id) = filter.get_mut(ID_FIELD) {
        coerce_id_value(id);
    }
    for op in ["$and", "$or", "$nor"] {
        if let Some(Bson::Array(clauses)) = filter.get_mut(op) {
            for clause in clauses.iter_mut() {
                if let Bson::Document(inner) = clause {
                    coerce_object_ids(inner);
                }
            }
        }
    }
}

fn coerce_id_value(value: &mut Bson) {
    let parsed = match value {
        Bson::String(s) => ObjectId::parse_str(s.as_str()).ok(),
        _ => None,
    };
    if let Some(oid) = parsed {
        *value = Bson::ObjectId(oid);
        return;
    }
    match value {
        Bson::Array(items) => items.iter_mut().for_each(coerce_id_value),
        Bson::Document(ops) => {
            for (key, inner) in ops.iter_mut() {
                if key.starts_with('$') {
                    coerce_id_value(inner);
                }
            }
        }
        _ => {}
    }
}

fn filter_document(filter: &Record) -> Document {
    let mut doc = to_document(filter);
    coerce_object_ids(&mut doc);
    doc
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> ConsoleResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConsoleError::connection(format!("MongoDB is not responding: {}", e)))?;
        Ok(())
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Record,
        projection: Option<&Record>,
        limit: usize,
    ) -> ConsoleResult<Vec<Record>> {
        let coll = self.collection(ns);
        let mut action = coll.find(filter_document(filter)).limit(limit as i64);
        if let Some(projection) = projection.filter(|p| !p.is_empty()) {
            action = action.projection(to_document(projection));
        }
        let cursor = action.await.map_err(store_error)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(store_error)?;
        debug!(namespace = %ns, count = docs.len(), "MongoDB find");
        Ok(docs.into_iter().map(from_document).collect())
    }

    async fn insert(&self, ns: &Namespace, record: Record) -> ConsoleResult<String> {
        let result = self
            .collection(ns)
            .insert_one(to_document(&record))
            .await
            .map_err(store_error)?;
        Ok(match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        })
    }

    async fn update(&self, ns: &Namespace, filter: &Record, update: &Record) -> ConsoleResult<u64> {
        let result = self
            .collection(ns)
            .update_many(filter_document(filter), to_document(update))
            .await
            .map_err(store_error)?;
        debug!(
            namespace = %ns,
            matched = result.matched_count,
            modified = result.modified_count,
            "MongoDB update"
        );
        Ok(result.modified_count)
    }

    async fn delete(&self, ns: &Namespace, filter: &Record) -> ConsoleResult<u64> {
        let result = self
            .collection(ns)
            .delete_many(filter_document(filter))
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count)
    }

    async fn aggregate(&self, ns: &Namespace, pipeline: &[Record]) -> ConsoleResult<Vec<Record>> {
        let stages: Vec<Document> = pipeline.iter().map(to_document).collect();
        let cursor = self
            .collection(ns)
            .aggregate(stages)
            .await
            .map_err(store_error)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(store_error)?;
        Ok(docs.into_iter().map(from_document).collect())
    }
}
