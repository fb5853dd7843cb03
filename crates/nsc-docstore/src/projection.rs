//! Projection for in-process backends, shared by `find` and `$project`.

use nsc_core::value::lookup;
use nsc_core::{ConsoleError, ConsoleResult, FieldValue, Record};

use crate::pipeline::eval_expr;
use crate::update::{remove_path, set_path, ID_FIELD};

enum Spec<'a> {
    Include,
    Exclude,
    Computed(&'a FieldValue),
}

fn classify(value: &FieldValue) -> Spec<'_> {
    match value {
        FieldValue::Bool(true) => Spec::Include,
        FieldValue::Bool(false) => Spec::Exclude,
        FieldValue::Int(_) | FieldValue::Float(_) => {
            if value.as_f64() == Some(0.0) {
                Spec::Exclude
            } else {
                Spec::Include
            }
        }
        other => Spec::Computed(other),
    }
}

/// Apply an inclusion or exclusion projection. `_id` stays unless excluded;
/// computed fields (`"$field"` references or expressions) count as
/// inclusions.
pub fn apply_projection(record: &Record, projection: &Record) -> ConsoleResult<Record> {
    if projection.is_empty() {
        return Ok(record.clone());
    }

    let mut including = false;
    let mut excluding = false;
    for (path, value) in projection {
        if path == ID_FIELD {
            continue;
        }
        match classify(value) {
            Spec::Exclude => excluding = true,
            Spec::Include | Spec::Computed(_) => including = true,
        }
        if including && excluding {
            return Err(ConsoleError::store(format!(
                "Cannot do exclusion on field {} in inclusion projection",
                path
            )));
        }
    }

    let keep_id = !matches!(projection.get(ID_FIELD).map(classify), Some(Spec::Exclude));
    // `{"_id": 1}` alone is an inclusion projection.
    if !including && !excluding && keep_id {
        including = true;
    }

    if excluding || !including {
        let mut out = record.clone();
        for (path, value) in projection {
            if matches!(classify(value), Spec::Exclude) {
                remove_path(&mut out, path);
            }
        }
        return Ok(out);
    }

    let mut out = Record::new();
    if keep_id {
        if let Some(id) = record.get(ID_FIELD) {
            out.insert(ID_FIELD.to_string(), id.clone());
        }
    }
    for (path, value) in projection {
        if path == ID_FIELD && !matches!(classify(value), Spec::Computed(_)) {
            continue;
        }
        match classify(value) {
            Spec::Include => {
                if let Some(found) = lookup(record, path) {
                    set_path(&mut out, path, found.clone())?;
                }
            }
            Spec::Computed(expr) => {
                set_path(&mut out, path, eval_expr(record, expr)?)?;
            }
            Spec::Exclude => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    const DOC: &str = r#"{"_id": "k1", "name": "Alice", "age": 30, "address": {"city": "Lyon", "zip": "69000"}}"#;

    #[test]
    fn test_inclusion_keeps_id() {
        let out = apply_projection(&record(DOC), &record(r#"{"name": 1}"#)).unwrap();
        assert_eq!(out, record(r#"{"_id": "k1", "name": "Alice"}"#));
    }

    #[test]
    fn test_inclusion_without_id() {
        let out = apply_projection(&record(DOC), &record(r#"{"name": true, "_id": 0}"#)).unwrap();
        assert_eq!(out, record(r#"{"name": "Alice"}"#));
    }

    #[test]
    fn test_exclusion() {
        let out =
            apply_projection(&record(DOC), &record(r#"{"address": 0, "age": false}"#)).unwrap();
        assert_eq!(out, record(r#"{"_id": "k1", "name": "Alice"}"#));
    }

    #[test]
    fn test_dotted_inclusion() {
        let out = apply_projection(&record(DOC), &record(r#"{"address.city": 1, "_id": 0}"#)).unwrap();
        assert_eq!(out, record(r#"{"address": {"city": "Lyon"}}"#));
    }

    #[test]
    fn test_computed_field() {
        let out =
            apply_projection(&record(DOC), &record(r#"{"_id": 0, "who": "$name"}"#)).unwrap();
        assert_eq!(out, record(r#"{"who": "Alice"}"#));
    }

    #[test]
    fn test_mixed_projection_fails() {
        assert!(apply_projection(&record(DOC), &record(r#"{"name": 1, "age": 0}"#)).is_err());
    }

    #[test]
    fn test_only_id_exclusion() {
        let out = apply_projection(&record(DOC), &record(r#"{"_id": 0}"#)).unwrap();
        assert!(!out.contains_key("_id"));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_only_id_inclusion() {
        let out = apply_projection(&record(DOC), &record(r#"{"_id": 1}"#)).unwrap();
        assert_eq!(out, record(r#"{"_id": "k1"}"#));

        let out = apply_projection(&record(DOC), &record(r#"{"_id": "$name"}"#)).unwrap();
        assert_eq!(out, record(r#"{"_id": "Alice"}"#));
    }
}
