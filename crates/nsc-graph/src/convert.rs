//! Parameter binding: field values to Bolt values.

use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType, Query};

use nsc_core::{FieldValue, Record};

pub fn to_bolt(value: &FieldValue) -> BoltType {
    match value {
        FieldValue::Null => BoltType::Null(BoltNull),
        FieldValue::Bool(b) => BoltType::from(*b),
        FieldValue::Int(i) => BoltType::from(*i),
        FieldValue::Float(f) => BoltType::from(*f),
        FieldValue::String(s) => BoltType::from(s.as_str()),
        FieldValue::List(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(to_bolt(item));
            }
            BoltType::List(list)
        }
        FieldValue::Map(map) => BoltType::Map(to_bolt_map(map)),
    }
}

pub fn to_bolt_map(record: &Record) -> BoltMap {
    let mut map = BoltMap::new();
    for (key, value) in record {
        map.put(BoltString::from(key.as_str()), to_bolt(value));
    }
    map
}

/// Bind every `(name, value)` pair onto `query`.
pub fn bind<'a>(
    mut query: Query,
    params: impl IntoIterator<Item = (&'a String, &'a FieldValue)>,
) -> Query {
    for (name, value) in params {
        query = query.param(name, to_bolt(value));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_map_becomes_bolt_map() {
        let record: Record = serde_json::from_str(r#"{"name": "A", "tags": ["x", 1]}"#).unwrap();
        match to_bolt(&FieldValue::Map(record)) {
            BoltType::Map(map) => {
                assert_eq!(map.value.len(), 2);
                assert!(matches!(
                    map.value.get(&BoltString::from("tags")),
                    Some(BoltType::List(list)) if list.value.len() == 2
                ));
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }
}
