//! Neo4j connection client.

use neo4rs::{ConfigBuilder, Graph, Query, Row};
use serde::de::DeserializeOwned;
use tracing::info;

use nsc_core::config::redact_uri;
use nsc_core::{ConsoleError, ConsoleResult};

/// Map a driver error onto the console taxonomy. Parser rejections keep the
/// server's message and become `QuerySyntax`.
pub fn classify(err: neo4rs::Error) -> ConsoleError {
    classify_message(err.to_string())
}

fn classify_message(message: String) -> ConsoleError {
    const SYNTAX_MARKERS: [&str; 3] = [
        "Neo.ClientError.Statement.SyntaxError",
        "SyntaxError",
        "Invalid input",
    ];
    if SYNTAX_MARKERS.iter().any(|marker| message.contains(marker)) {
        ConsoleError::query_syntax(message)
    } else {
        ConsoleError::store(message)
    }
}

/// Client for Neo4j graph operations.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Build the pool and ping it.
    ///
    /// `Graph::connect` only creates the pool; the `RETURN 1` forces a bolt
    /// handshake so an unreachable server or bad credentials fail here.
    pub async fn connect(uri: &str, user: &str, password: &str) -> ConsoleResult<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .max_connections(4)
            .fetch_size(200)
            .build()
            .map_err(|e| ConsoleError::config(format!("invalid Neo4j settings: {}", e)))?;

        let graph = Graph::connect(config).await.map_err(|e| {
            ConsoleError::connection(format!("cannot connect to Neo4j at {}: {}", redact_uri(uri), e))
        })?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(|e| ConsoleError::connection(format!("Neo4j is not responding: {}", e)))?;

        info!(uri = %redact_uri(uri), user = user, "Connected to Neo4j");
        Ok(Self { graph })
    }

    pub async fn ping(&self) -> ConsoleResult<()> {
        self.execute(Query::new("RETURN 1".to_string())).await
    }

    /// Execute a Cypher statement, discarding results.
    pub async fn execute(&self, query: Query) -> ConsoleResult<()> {
        self.graph.run(query).await.map_err(classify)
    }

    /// Execute a Cypher query and collect every row.
    pub async fn query(&self, query: Query) -> ConsoleResult<Vec<Row>> {
        let mut result = self.graph.execute(query).await.map_err(classify)?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await.map_err(classify)? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// First row's `field`, if there is a row.
    pub async fn query_scalar<T: DeserializeOwned>(
        &self,
        query: Query,
        field: &str,
    ) -> ConsoleResult<Option<T>> {
        match self.query(query).await?.into_iter().next() {
            Some(row) => column(&row, field).map(Some),
            None => Ok(None),
        }
    }
}

/// Deserialize one column of a row.
pub fn column<T: DeserializeOwned>(row: &Row, field: &str) -> ConsoleResult<T> {
    row.get::<T>(field)
        .map_err(|e| ConsoleError::store(format!("failed to read column '{}': {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsc_core::ErrorKind;

    #[test]
    fn test_parser_rejection_is_syntax_error() {
        let message = "Neo4j error `Neo.ClientError.Statement.SyntaxError`: Invalid input 'MATC': expected <init> (line 1, column 1)";
        let err = classify_message(message.to_string());
        assert_eq!(err.kind(), ErrorKind::QuerySyntaxError);
        assert_eq!(err.message(), message);
    }

    #[test]
    fn test_other_failures_are_store_errors() {
        let err = classify_message(
            "Neo4j error `Neo.ClientError.Schema.ConstraintValidationFailed`: Node(0) already exists".to_string(),
        );
        assert_eq!(err.kind(), ErrorKind::StoreError);
        assert!(err.message().contains("ConstraintValidationFailed"));
    }
}
