//! Graph statistics for the visualization panel.

use neo4rs::Query;
use std::collections::BTreeMap;

use nsc_core::{ConsoleResult, GraphStatistics};

use crate::client::{column, GraphClient};

async fn distribution(client: &GraphClient, cypher: &str, key: &str) -> ConsoleResult<BTreeMap<String, u64>> {
    let mut counts = BTreeMap::new();
    for row in client.query(Query::new(cypher.to_string())).await? {
        let name: String = column(&row, key)?;
        let count: i64 = column(&row, "count")?;
        counts.insert(name, count.max(0) as u64);
    }
    Ok(counts)
}

pub async fn statistics(client: &GraphClient) -> ConsoleResult<GraphStatistics> {
    let node_count: i64 = client
        .query_scalar(Query::new("MATCH (n) RETURN count(n) AS count".to_string()), "count")
        .await?
        .unwrap_or(0);
    let relationship_count: i64 = client
        .query_scalar(
            Query::new("MATCH ()-[r]->() RETURN count(r) AS count".to_string()),
            "count",
        )
        .await?
        .unwrap_or(0);

    Ok(GraphStatistics {
        node_count: node_count.max(0) as u64,
        relationship_count: relationship_count.max(0) as u64,
        label_counts: distribution(
            client,
            "MATCH (n) UNWIND labels(n) AS label RETURN label, count(*) AS count",
            "label",
        )
        .await?,
        type_counts: distribution(
            client,
            "MATCH ()-[r]->() RETURN type(r) AS type, count(*) AS count",
            "type",
        )
        .await?,
    })
}
