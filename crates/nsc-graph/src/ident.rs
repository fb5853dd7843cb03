//! Identifier checks for labels, relationship types and property keys that
//! are spliced into generated Cypher.

use nsc_core::{ConsoleError, ConsoleResult};

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate `name` as a `what` (e.g. "label") and return it backtick-quoted.
pub fn quoted(what: &str, name: &str) -> ConsoleResult<String> {
    if is_identifier(name) {
        Ok(format!("`{}`", name))
    } else {
        Err(ConsoleError::validation(format!(
            "invalid {} '{}': use letters, digits and underscores",
            what, name
        )))
    }
}

/// `:`A`:`B`` for a label list; empty when there are no labels.
pub fn label_clause(labels: &[String]) -> ConsoleResult<String> {
    labels
        .iter()
        .map(|l| quoted("label", l.trim()).map(|q| format!(":{}", q)))
        .collect()
}
