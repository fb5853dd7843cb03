//! Dynamically-typed field values shared by documents and graph properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{ConsoleError, ConsoleResult};

/// Ordered mapping from field name to value.
pub type Record = IndexMap<String, FieldValue>;

/// A user-entered or store-returned value.
///
/// Serialized as plain JSON: `30` is an `Int`, `30.5` a `Float`,
/// `{"a": 1}` a `Map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Map(Record),
}

impl FieldValue {
    /// Numeric view used by charts, comparisons and accumulators.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_) | FieldValue::Float(_))
    }

    /// True for values a graph property may hold directly.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldValue::List(_) | FieldValue::Map(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Int(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }

    /// Text shown in a table cell or a hover tooltip.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::String(s) => s.clone(),
            FieldValue::List(_) | FieldValue::Map(_) => {
                serde_json::Value::from(self.clone()).to_string()
            }
        }
    }

    /// Equality where `Int(1)` equals `Float(1.0)`.
    pub fn loose_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w)))
            }
            (a, b) => a == b,
        }
    }

    /// Ordering between values of comparable types; `None` across types.
    pub fn partial_compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Total order used for sorting: null < numbers < strings < maps < lists
    /// < booleans, then by value within a type.
    pub fn total_cmp(&self, other: &FieldValue) -> Ordering {
        let rank = |v: &FieldValue| match v {
            FieldValue::Null => 0,
            FieldValue::Int(_) | FieldValue::Float(_) => 1,
            FieldValue::String(_) => 2,
            FieldValue::Map(_) => 3,
            FieldValue::List(_) => 4,
            FieldValue::Bool(_) => 5,
        };
        match rank(self).cmp(&rank(other)) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match (self, other) {
            (FieldValue::List(a), FieldValue::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.total_cmp(y) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                a.len().cmp(&b.len())
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                    match ka.cmp(kb).then_with(|| va.total_cmp(vb)) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => a.partial_compare(b).unwrap_or(Ordering::Equal),
        }
    }
}

/// Resolve a dotted path (`address.city`, `tags.0`) inside a record.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a FieldValue> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            FieldValue::Map(map) => map.get(segment)?,
            FieldValue::List(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Parse a UI-supplied JSON object into a record.
pub fn record_from_json(value: serde_json::Value) -> ConsoleResult<Record> {
    match FieldValue::try_from(value)? {
        FieldValue::Map(record) => Ok(record),
        other => Err(ConsoleError::validation(format!(
            "expected a JSON object, got {}",
            other.type_name()
        ))),
    }
}

/// Numbers that fit neither `i64` nor `f64` are a `ValidationError`.
impl TryFrom<serde_json::Value> for FieldValue {
    type Error = ConsoleError;

    fn try_from(value: serde_json::Value) -> ConsoleResult<Self> {
        Ok(match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => FieldValue::Int(i),
                (None, Some(f)) if f.is_finite() => FieldValue::Float(f),
                _ => {
                    return Err(ConsoleError::validation(format!(
                        "number {} is out of range",
                        n
                    )))
                }
            },
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => FieldValue::List(
                items
                    .into_iter()
                    .map(FieldValue::try_from)
                    .collect::<ConsoleResult<_>>()?,
            ),
            serde_json::Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| Ok((k, FieldValue::try_from(v)?)))
                    .collect::<ConsoleResult<_>>()?,
            ),
        })
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(b),
            FieldValue::Int(i) => serde_json::Value::from(i),
            FieldValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::String(s) => serde_json::Value::String(s),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            FieldValue::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<Record> for FieldValue {
    fn from(map: Record) -> Self {
        FieldValue::Map(map)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}
