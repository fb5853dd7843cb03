//! In-process application of update-operator documents (`$set`, `$unset`,
//! `$inc`) plus the dotted-path helpers shared with projection.

use nsc_core::{ConsoleError, ConsoleResult, FieldValue, Record};

pub const ID_FIELD: &str = "_id";

/// Apply `update` to `record`. Returns whether the record changed.
pub fn apply_update(record: &mut Record, update: &Record) -> ConsoleResult<bool> {
    if update.is_empty() {
        return Err(ConsoleError::store("update document must not be empty"));
    }

    let before = record.clone();
    for (op, fields) in update {
        let fields = fields.as_map().ok_or_else(|| {
            ConsoleError::store(format!("modifier {} expects an object", op))
        })?;
        for (path, value) in fields {
            if path == ID_FIELD || path.starts_with("_id.") {
                check_id_unchanged(&before, op, value)?;
                continue;
            }
            match op.as_str() {
                "$set" => set_path(record, path, value.clone())?,
                "$unset" => {
                    remove_path(record, path);
                }
                "$inc" => increment(record, path, value)?,
                other => {
                    return Err(ConsoleError::store(format!("Unknown modifier: {}", other)))
                }
            }
        }
    }
    Ok(*record != before)
}

fn check_id_unchanged(before: &Record, op: &str, value: &FieldValue) -> ConsoleResult<()> {
    let unchanged = op == "$set" && before.get(ID_FIELD).is_some_and(|id| id.loose_eq(value));
    if unchanged {
        Ok(())
    } else {
        Err(ConsoleError::store(
            "Performing an update on the path '_id' would modify the immutable field '_id'",
        ))
    }
}

fn increment(record: &mut Record, path: &str, by: &FieldValue) -> ConsoleResult<()> {
    if !by.is_numeric() {
        return Err(ConsoleError::store(format!(
            "Cannot increment with non-numeric argument: {{{}: {}}}",
            path,
            by.display_text()
        )));
    }
    let next = match nsc_core::value::lookup(record, path) {
        None => by.clone(),
        Some(FieldValue::Int(a)) => match by {
            FieldValue::Int(b) => a
                .checked_add(*b)
                .map(FieldValue::Int)
                .unwrap_or(FieldValue::Float(*a as f64 + *b as f64)),
            _ => FieldValue::Float(*a as f64 + by.as_f64().unwrap_or(0.0)),
        },
        Some(FieldValue::Float(a)) => FieldValue::Float(a + by.as_f64().unwrap_or(0.0)),
        Some(other) => {
            return Err(ConsoleError::store(format!(
                "Cannot apply $inc to a value of non-numeric type {} at '{}'",
                other.type_name(),
                path
            )))
        }
    };
    set_path(record, path, next)
}

/// Set a dotted path, creating intermediate objects.
pub fn set_path(record: &mut Record, path: &str, value: FieldValue) -> ConsoleResult<()> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);
    let mut current = record;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| FieldValue::Map(Record::new()));
        current = match entry {
            FieldValue::Map(map) => map,
            other => {
                return Err(ConsoleError::store(format!(
                    "Cannot create field '{}' in element {{{}: {}}}",
                    last,
                    segment,
                    other.display_text()
                )))
            }
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}

/// Remove a dotted path; returns the removed value.
pub fn remove_path(record: &mut Record, path: &str) -> Option<FieldValue> {
    match path.split_once('.') {
        None => record.shift_remove(path),
        Some((head, rest)) => match record.get_mut(head) {
            Some(FieldValue::Map(inner)) => remove_path(inner, rest),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_set_existing_and_nested() {
        let mut doc = record(r#"{"_id": "1", "name": "Alice"}"#);
        let changed = apply_update(
            &mut doc,
            &record(r#"{"$set": {"name": "Alicia", "address.city": "Lyon"}}"#),
        )
        .unwrap();
        assert!(changed);
        assert_eq!(doc, record(r#"{"_id": "1", "name": "Alicia", "address": {"city": "Lyon"}}"#));
    }

    #[test]
    fn test_identical_set_reports_unchanged() {
        let mut doc = record(r#"{"name": "Alice"}"#);
        assert!(!apply_update(&mut doc, &record(r#"{"$set": {"name": "Alice"}}"#)).unwrap());
    }

    #[test]
    fn test_unset_and_inc() {
        let mut doc = record(r#"{"age": 30, "tmp": true, "score": 1.5}"#);
        apply_update(
            &mut doc,
            &record(r#"{"$unset": {"tmp": ""}, "$inc": {"age": 1, "score": 1, "visits": 2}}"#),
        )
        .unwrap();
        assert_eq!(doc, record(r#"{"age": 31, "score": 2.5, "visits": 2}"#));
    }

    #[test]
    fn test_inc_on_string_fails() {
        let mut doc = record(r#"{"age": "thirty"}"#);
        assert!(apply_update(&mut doc, &record(r#"{"$inc": {"age": 1}}"#)).is_err());
    }

    #[test]
    fn test_id_is_immutable() {
        let mut doc = record(r#"{"_id": "1"}"#);
        assert!(apply_update(&mut doc, &record(r#"{"$set": {"_id": "2"}}"#)).is_err());
        assert!(apply_update(&mut doc, &record(r#"{"$set": {"_id": "1"}}"#)).is_ok());
    }

    #[test]
    fn test_unknown_modifier() {
        let mut doc = record(r#"{"a": 1}"#);
        let err = apply_update(&mut doc, &record(r#"{"$rename": {"a": "b"}}"#)).unwrap_err();
        assert!(err.message().contains("$rename"));
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut doc = record(r#"{"a": 1}"#);
        assert!(set_path(&mut doc, "a.b", FieldValue::Int(2)).is_err());
    }

    #[test]
    fn test_remove_nested_path() {
        let mut doc = record(r#"{"a": {"b": 1, "c": 2}}"#);
        assert_eq!(remove_path(&mut doc, "a.b"), Some(FieldValue::Int(1)));
        assert_eq!(doc, record(r#"{"a": {"c": 2}}"#));
        assert_eq!(remove_path(&mut doc, "x.y"), None);
    }
}
