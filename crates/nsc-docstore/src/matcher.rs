//! In-process evaluation of the filter vocabulary.
//!
//! Used by backends that store plain JSON (memory, Redis). Supports field
//! equality with dotted paths and array membership, the comparison operators
//! `$eq $ne $gt $gte $lt $lte $in $nin $exists $not`, and the logical
//! operators `$and $or $nor`.

use std::cmp::Ordering;

use nsc_core::value::lookup;
use nsc_core::{ConsoleError, ConsoleResult, FieldValue, Record};

/// True when `record` satisfies every clause of `filter`.
pub fn matches(record: &Record, filter: &Record) -> ConsoleResult<bool> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let clauses = clause_list(key, condition)?;
                let mut all = true;
                for clause in clauses {
                    if !matches(record, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => any_clause(record, key, condition)?,
            "$nor" => !any_clause(record, key, condition)?,
            op if op.starts_with('$') => {
                return Err(ConsoleError::store(format!("unknown top level operator: {}", op)))
            }
            path => field_matches(lookup(record, path), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clause_list<'a>(op: &str, condition: &'a FieldValue) -> ConsoleResult<Vec<&'a Record>> {
    let items = match condition {
        FieldValue::List(items) if !items.is_empty() => items,
        _ => {
            return Err(ConsoleError::store(format!(
                "{} argument must be a non-empty array",
                op
            )))
        }
    };
    items
        .iter()
        .map(|item| {
            item.as_map().ok_or_else(|| {
                ConsoleError::store(format!("{} argument's entries must be objects", op))
            })
        })
        .collect()
}

fn any_clause(record: &Record, op: &str, condition: &FieldValue) -> ConsoleResult<bool> {
    for clause in clause_list(op, condition)? {
        if matches(record, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// An object whose keys are all operators, e.g. `{"$gt": 3}`.
fn operator_map(condition: &FieldValue) -> Option<&Record> {
    condition
        .as_map()
        .filter(|m| !m.is_empty() && m.keys().all(|k| k.starts_with('$')))
}

fn field_matches(value: Option<&FieldValue>, condition: &FieldValue) -> ConsoleResult<bool> {
    match operator_map(condition) {
        Some(ops) => {
            for (op, arg) in ops {
                if !apply_operator(value, op, arg)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        None => Ok(equals(value, condition)),
    }
}

fn apply_operator(value: Option<&FieldValue>, op: &str, arg: &FieldValue) -> ConsoleResult<bool> {
    match op {
        "$eq" => Ok(equals(value, arg)),
        "$ne" => Ok(!equals(value, arg)),
        "$gt" => Ok(compares(value, arg, |o| o == Ordering::Greater)),
        "$gte" => Ok(compares(value, arg, |o| o != Ordering::Less)),
        "$lt" => Ok(compares(value, arg, |o| o == Ordering::Less)),
        "$lte" => Ok(compares(value, arg, |o| o != Ordering::Greater)),
        "$in" => Ok(in_list(value, op, arg)?),
        "$nin" => Ok(!in_list(value, op, arg)?),
        "$exists" => {
            let wanted = match arg {
                FieldValue::Bool(b) => *b,
                other => other.as_f64().map(|n| n != 0.0).unwrap_or(true),
            };
            Ok(value.is_some() == wanted)
        }
        "$not" => match operator_map(arg) {
            Some(_) => Ok(!field_matches(value, arg)?),
            None => Err(ConsoleError::store("$not needs an operator expression")),
        },
        other => Err(ConsoleError::store(format!("unknown operator: {}", other))),
    }
}

/// Equality with missing-equals-null and array membership.
fn equals(value: Option<&FieldValue>, expected: &FieldValue) -> bool {
    match value {
        None => expected.is_null(),
        Some(actual) if actual.loose_eq(expected) => true,
        Some(FieldValue::List(items)) => items.iter().any(|item| item.loose_eq(expected)),
        Some(_) => false,
    }
}

fn compares(value: Option<&FieldValue>, arg: &FieldValue, accept: impl Fn(Ordering) -> bool) -> bool {
    let check = |v: &FieldValue| v.partial_compare(arg).is_some_and(&accept);
    match value {
        None => false,
        Some(FieldValue::List(items)) if !matches!(arg, FieldValue::List(_)) => {
            items.iter().any(check)
        }
        Some(v) => check(v),
    }
}

fn in_list(value: Option<&FieldValue>, op: &str, arg: &FieldValue) -> ConsoleResult<bool> {
    match arg {
        FieldValue::List(candidates) => Ok(candidates.iter().any(|c| equals(value, c))),
        _ => Err(ConsoleError::store(format!("{} needs an array", op))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    fn check(doc: &str, filter: &str) -> bool {
        matches(&record(doc), &record(filter)).unwrap()
    }

    const ALICE: &str = r#"{"name": "Alice", "age": 30, "tags": ["admin", "ops"], "address": {"city": "Lyon"}}"#;

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(check(ALICE, "{}"));
    }

    #[test]
    fn test_equality_and_dotted_paths() {
        assert!(check(ALICE, r#"{"name": "Alice"}"#));
        assert!(check(ALICE, r#"{"age": 30.0}"#));
        assert!(check(ALICE, r#"{"address.city": "Lyon"}"#));
        assert!(!check(ALICE, r#"{"address.city": "Paris"}"#));
    }

    #[test]
    fn test_array_membership() {
        assert!(check(ALICE, r#"{"tags": "ops"}"#));
        assert!(check(ALICE, r#"{"tags": ["admin", "ops"]}"#));
        assert!(!check(ALICE, r#"{"tags": "dev"}"#));
    }

    #[test]
    fn test_missing_field_equals_null() {
        assert!(check(ALICE, r#"{"email": null}"#));
        assert!(!check(ALICE, r#"{"email": {"$exists": true}}"#));
        assert!(check(ALICE, r#"{"name": {"$exists": 1}}"#));
    }

    #[test]
    fn test_comparison_operators() {
        assert!(check(ALICE, r#"{"age": {"$gt": 18, "$lte": 30}}"#));
        assert!(!check(ALICE, r#"{"age": {"$lt": 30}}"#));
        assert!(check(ALICE, r#"{"age": {"$ne": 31}}"#));
        assert!(!check(ALICE, r#"{"age": {"$gt": "20"}}"#));
        assert!(!check(ALICE, r#"{"salary": {"$gt": 0}}"#));
    }

    #[test]
    fn test_in_and_nin() {
        assert!(check(ALICE, r#"{"age": {"$in": [20, 30]}}"#));
        assert!(check(ALICE, r#"{"tags": {"$in": ["dev", "ops"]}}"#));
        assert!(check(ALICE, r#"{"name": {"$nin": ["Bob"]}}"#));
        assert!(matches(&record(ALICE), &record(r#"{"age": {"$in": 30}}"#)).is_err());
    }

    #[test]
    fn test_logical_operators() {
        assert!(check(ALICE, r#"{"$or": [{"name": "Bob"}, {"age": 30}]}"#));
        assert!(!check(ALICE, r#"{"$and": [{"name": "Alice"}, {"age": 31}]}"#));
        assert!(check(ALICE, r#"{"$nor": [{"name": "Bob"}]}"#));
        assert!(check(ALICE, r#"{"age": {"$not": {"$gt": 40}}}"#));
    }

    #[test]
    fn test_unknown_operators_are_store_errors() {
        let err = matches(&record(ALICE), &record(r#"{"age": {"$near": 1}}"#)).unwrap_err();
        assert!(err.message().contains("$near"));
        assert!(matches(&record(ALICE), &record(r#"{"$where": "1"}"#)).is_err());
        assert!(matches(&record(ALICE), &record(r#"{"$or": []}"#)).is_err());
    }

    #[test]
    fn test_literal_subdocument_equality() {
        assert!(check(ALICE, r#"{"address": {"city": "Lyon"}}"#));
        assert!(!check(ALICE, r#"{"address": {"city": "Lyon", "zip": 1}}"#));
    }
}
