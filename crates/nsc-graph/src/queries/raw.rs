//! Pass-through query execution.

use neo4rs::Query;
use tracing::debug;

use nsc_core::{ConsoleError, ConsoleResult, CypherQuery, Record};

use crate::client::GraphClient;
use crate::convert::bind;

/// Run `query` as typed, binding its parameters. Each row becomes a record
/// keyed by column name.
pub async fn run_query(client: &GraphClient, query: &CypherQuery) -> ConsoleResult<Vec<Record>> {
    debug!(cypher = %query.text, params = query.parameters.len(), "run query");
    let bound = bind(Query::new(query.text.clone()), &query.parameters);
    client
        .query(bound)
        .await?
        .iter()
        .map(|row| {
            row.to::<Record>()
                .map_err(|e| ConsoleError::store(format!("cannot read result row: {}", e)))
        })
        .collect()
}
