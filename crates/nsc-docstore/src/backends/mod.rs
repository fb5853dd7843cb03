//! Document store backends, selected by URI scheme.

pub mod memory;
pub mod mongo;
pub mod redis;

use std::sync::Arc;

use nsc_core::config::{redact_uri, uri_scheme};
use nsc_core::{ConsoleError, ConsoleResult};

use crate::store::DocumentStore;

pub use memory::MemoryDocumentStore;
pub use mongo::MongoDocumentStore;
pub use redis::RedisDocumentStore;

/// Open the backend named by `uri` and ping it once.
pub async fn connect(uri: &str) -> ConsoleResult<Arc<dyn DocumentStore>> {
    let scheme = uri_scheme(uri).unwrap_or_default();
    let store: Arc<dyn DocumentStore> = match scheme.as_str() {
        "mongodb" | "mongodb+srv" => Arc::new(MongoDocumentStore::connect(uri).await?),
        "redis" | "rediss" => Arc::new(RedisDocumentStore::connect(uri).await?),
        "memory" => Arc::new(MemoryDocumentStore::new()),
        _ => {
            return Err(ConsoleError::config(format!(
                "unsupported document store URI: {}",
                redact_uri(uri)
            )))
        }
    };
    store.ping().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_scheme() {
        let store = connect("memory://local").await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_config_error() {
        let err = connect("postgres://localhost/db").await.err().unwrap();
        assert_eq!(err.kind(), nsc_core::ErrorKind::ConfigError);
    }
}
