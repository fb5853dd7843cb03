//! Cypher builders and readers, one module per concern.
//!
//! Nodes and relationships come back as map projections so they deserialize
//! straight into the core graph types.

pub mod nodes;
pub mod path;
pub mod raw;
pub mod relationships;
pub mod stats;

use nsc_core::{ConsoleResult, Record};

use crate::ident::quoted;

/// `{id, labels, properties}` for node variable `var`.
pub(crate) fn node_map(var: &str) -> String {
    format!(
        "{{id: id({v}), labels: labels({v}), properties: properties({v})}}",
        v = var
    )
}

/// `{id, type, source, target, properties}` for relationship variable `var`.
pub(crate) fn relationship_map(var: &str) -> String {
    format!(
        "{{id: id({v}), type: type({v}), source: id(startNode({v})), \
         target: id(endNode({v})), properties: properties({v})}}",
        v = var
    )
}

/// `WHERE var.`k0` = $p0 AND ...` plus the parameters to bind. Empty when
/// there is nothing to filter on.
pub(crate) fn property_filter(var: &str, properties: &Record) -> ConsoleResult<(String, Record)> {
    let mut clauses = Vec::with_capacity(properties.len());
    let mut params = Record::new();
    for (i, (key, value)) in properties.iter().enumerate() {
        let name = format!("p{}", i);
        clauses.push(format!("{}.{} = ${}", var, quoted("property key", key)?, name));
        params.insert(name, value.clone());
    }
    if clauses.is_empty() {
        Ok((String::new(), params))
    } else {
        Ok((format!("WHERE {}", clauses.join(" AND ")), params))
    }
}
