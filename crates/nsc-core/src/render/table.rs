//! Tabular view of arbitrarily-shaped records.

use indexmap::IndexSet;
use serde::Serialize;

use crate::value::Record;

/// Column headers plus one row of cell text per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Columns are the union of keys in first-seen order; a field missing from a
/// record renders as an empty cell.
pub fn to_table(records: &[Record]) -> Table {
    let columns: IndexSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| {
                    record
                        .get(*col)
                        .map(|v| v.display_text())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Table {
        columns: columns.into_iter().map(str::to_string).collect(),
        rows,
    }
}
