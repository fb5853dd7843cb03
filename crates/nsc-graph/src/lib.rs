//! NoSQL Console graph store
//!
//! The [`GraphAdapter`] over Neo4j and an in-memory property graph.

pub mod adapter;
pub mod client;
pub mod convert;
pub mod ident;
pub mod memory;
pub mod neo4j;
pub mod queries;
pub mod store;

use std::sync::Arc;

use nsc_core::config::{redact_uri, uri_scheme};
use nsc_core::{ConsoleError, ConsoleResult};

pub use adapter::GraphAdapter;
pub use client::GraphClient;
pub use memory::MemoryGraphStore;
pub use neo4j::Neo4jGraphStore;
pub use store::GraphStore;

/// Open the backend named by `uri`.
pub async fn connect(uri: &str, user: &str, password: &str) -> ConsoleResult<Arc<dyn GraphStore>> {
    let scheme = uri_scheme(uri).unwrap_or_default();
    let store: Arc<dyn GraphStore> = match scheme.as_str() {
        "bolt" | "bolt+s" | "bolt+ssc" | "neo4j" | "neo4j+s" | "neo4j+ssc" => {
            Arc::new(Neo4jGraphStore::connect(uri, user, password).await?)
        }
        "memory" => Arc::new(MemoryGraphStore::new()),
        _ => {
            return Err(ConsoleError::config(format!(
                "unsupported graph store URI: {}",
                redact_uri(uri)
            )))
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scheme_dispatch() {
        let store = connect("memory://local", "", "").await.unwrap();
        assert_eq!(store.name(), "memory");
        let err = connect("http://localhost:7474", "neo4j", "pw").await.err().unwrap();
        assert_eq!(err.kind(), nsc_core::ErrorKind::ConfigError);
    }
}
