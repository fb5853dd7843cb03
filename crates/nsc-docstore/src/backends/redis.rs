//! Redis-backed document store (`redis://`, `rediss://`).
//!
//! Each record is a JSON blob in the `data` field of a hash at
//! `nsc:{database}:{collection}:doc:{id}`. A sorted set
//! `nsc:{database}:{collection}:docs` keeps insertion order, scored by a
//! per-collection sequence. Filters, updates and pipelines run in-process.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use nsc_core::config::redact_uri;
use nsc_core::{ConsoleError, ConsoleResult, Namespace, Record};

use crate::backends::memory::{duplicate_key, with_id};
use crate::matcher::matches;
use crate::pipeline::run_pipeline;
use crate::projection::apply_projection;
use crate::store::DocumentStore;
use crate::update::apply_update;

/// Redis connection pool. ConnectionManager multiplexes internally and is
/// cheap to clone per operation.
pub type RedisPool = ConnectionManager;

pub struct RedisDocumentStore {
    pool: RedisPool,
}

fn store_error(err: redis::RedisError) -> ConsoleError {
    ConsoleError::store(format!("Redis error: {}", err))
}

fn doc_key(ns: &Namespace, id: &str) -> String {
    format!("nsc:{}:{}:doc:{}", ns.database, ns.collection, id)
}

fn index_key(ns: &Namespace) -> String {
    format!("nsc:{}:{}:docs", ns.database, ns.collection)
}

fn sequence_key(ns: &Namespace) -> String {
    format!("nsc:{}:{}:seq", ns.database, ns.collection)
}

fn encode(record: &Record) -> ConsoleResult<String> {
    serde_json::to_string(record).map_err(|e| ConsoleError::store(e.to_string()))
}

/// One `HGET` per id, sent in a single round-trip.
fn read_pipe(ns: &Namespace, ids: &[String]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    for id in ids {
        pipe.hget(doc_key(ns, id), "data");
    }
    pipe
}

/// Store a new record and index it at `seq` in one MULTI/EXEC.
fn insert_pipe(ns: &Namespace, id: &str, record: &Record, seq: i64) -> ConsoleResult<redis::Pipeline> {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .hset(doc_key(ns, id), "data", encode(record)?)
        .ignore()
        .zadd(index_key(ns), id, seq)
        .ignore();
    Ok(pipe)
}

/// Overwrite every staged record in one MULTI/EXEC.
fn update_pipe(ns: &Namespace, staged: &[(String, Record)]) -> ConsoleResult<redis::Pipeline> {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for (id, record) in staged {
        pipe.hset(doc_key(ns, id), "data", encode(record)?).ignore();
    }
    Ok(pipe)
}

/// Drop documents and their index entries in one MULTI/EXEC.
fn delete_pipe(ns: &Namespace, ids: &[String]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for id in ids {
        pipe.del(doc_key(ns, id)).ignore();
        pipe.zrem(index_key(ns), id).ignore();
    }
    pipe
}

impl RedisDocumentStore {
    /// Open a connection manager for `redis_url`, e.g. `redis://127.0.0.1:6379`.
    pub async fn connect(redis_url: &str) -> ConsoleResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| ConsoleError::connection(format!("invalid Redis URL: {}", e)))?;
        let pool = ConnectionManager::new(client).await.map_err(|e| {
            ConsoleError::connection(format!(
                "cannot reach Redis at {}: {}",
                redact_uri(redis_url),
                e
            ))
        })?;
        info!(url = %redact_uri(redis_url), "Connected to Redis document store");
        Ok(Self { pool })
    }

    /// Every record of a collection with its id, in insertion order.
    async fn load_all(&self, ns: &Namespace) -> ConsoleResult<Vec<(String, Record)>> {
        let mut conn = self.pool.clone();
        let ids: Vec<String> = conn.zrange(index_key(ns), 0, -1).await.map_err(store_error)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let blobs: Vec<Option<String>> = read_pipe(ns, &ids)
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;

        let mut records = Vec::with_capacity(ids.len());
        for (id, blob) in ids.into_iter().zip(blobs) {
            if let Some(j) = blob {
                let record: Record = serde_json::from_str(&j).map_err(|e| {
                    ConsoleError::store(format!("corrupt document {} in {}: {}", id, ns, e))
                })?;
                records.push((id, record));
            }
        }
        Ok(records)
    }

    async fn commit(&self, pipe: &redis::Pipeline) -> ConsoleResult<()> {
        let mut conn = self.pool.clone();
        let () = pipe.query_async(&mut conn).await.map_err(store_error)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> ConsoleResult<()> {
        let mut conn = self.pool.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ConsoleError::connection(format!("Redis is not responding: {}", e)))?;
        Ok(())
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Record,
        projection: Option<&Record>,
        limit: usize,
    ) -> ConsoleResult<Vec<Record>> {
        let mut out = Vec::new();
        for (_, record) in self.load_all(ns).await? {
            if out.len() >= limit {
                break;
            }
            if matches(&record, filter)? {
                out.push(match projection {
                    Some(p) => apply_projection(&record, p)?,
                    None => record,
                });
            }
        }
        debug!(namespace = %ns, count = out.len(), "Redis find");
        Ok(out)
    }

    async fn insert(&self, ns: &Namespace, record: Record) -> ConsoleResult<String> {
        let (id, record) = with_id(record);
        let mut conn = self.pool.clone();

        let exists: bool = conn.exists(doc_key(ns, &id)).await.map_err(store_error)?;
        if exists {
            return Err(duplicate_key(ns, &id));
        }

        // A failed commit only leaves a gap in the sequence.
        let seq: i64 = conn.incr(sequence_key(ns), 1).await.map_err(store_error)?;
        self.commit(&insert_pipe(ns, &id, &record, seq)?).await?;
        Ok(id)
    }

    async fn update(&self, ns: &Namespace, filter: &Record, update: &Record) -> ConsoleResult<u64> {
        let mut staged = Vec::new();
        for (id, record) in self.load_all(ns).await? {
            if matches(&record, filter)? {
                let mut copy = record;
                if apply_update(&mut copy, update)? {
                    staged.push((id, copy));
                }
            }
        }
        if !staged.is_empty() {
            self.commit(&update_pipe(ns, &staged)?).await?;
        }
        Ok(staged.len() as u64)
    }

    async fn delete(&self, ns: &Namespace, filter: &Record) -> ConsoleResult<u64> {
        let mut doomed = Vec::new();
        for (id, record) in self.load_all(ns).await? {
            if matches(&record, filter)? {
                doomed.push(id);
            }
        }
        if !doomed.is_empty() {
            self.commit(&delete_pipe(ns, &doomed)).await?;
        }
        Ok(doomed.len() as u64)
    }

    async fn aggregate(&self, ns: &Namespace, pipeline: &[Record]) -> ConsoleResult<Vec<Record>> {
        let records = self
            .load_all(ns)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        run_pipeline(records, pipeline)
    }
}
