//! In-process aggregation pipeline for backends without a server-side
//! engine.
//!
//! Stages: `$match $group $sort $limit $skip $project $count $unwind`.
//! Group accumulators: `$sum $avg $min $max $first $last $push $count`.

use std::cmp::Ordering;
use std::collections::HashMap;

use nsc_core::value::lookup;
use nsc_core::{ConsoleError, ConsoleResult, FieldValue, Record};

use crate::matcher::matches;
use crate::projection::apply_projection;
use crate::update::ID_FIELD;

/// Run `stages` over `records` in order.
pub fn run_pipeline(mut records: Vec<Record>, stages: &[Record]) -> ConsoleResult<Vec<Record>> {
    for stage in stages {
        let (name, spec) = match stage.len() {
            1 => stage.iter().next().ok_or_else(stage_shape_error)?,
            _ => return Err(stage_shape_error()),
        };
        records = match name.as_str() {
            "$match" => {
                let filter = expect_map(name, spec)?;
                let mut kept = Vec::with_capacity(records.len());
                for record in records {
                    if matches(&record, filter)? {
                        kept.push(record);
                    }
                }
                kept
            }
            "$group" => group(records, expect_map(name, spec)?)?,
            "$sort" => sort(records, expect_map(name, spec)?)?,
            "$limit" => {
                let n = expect_count(name, spec)?;
                if n == 0 {
                    return Err(ConsoleError::store("the limit must be positive"));
                }
                records.into_iter().take(n).collect()
            }
            "$skip" => {
                let n = expect_count(name, spec)?;
                records.into_iter().skip(n).collect()
            }
            "$project" => {
                let projection = expect_map(name, spec)?;
                records
                    .iter()
                    .map(|r| apply_projection(r, projection))
                    .collect::<ConsoleResult<_>>()?
            }
            "$count" => {
                let field = spec
                    .as_str()
                    .filter(|s| !s.is_empty() && !s.starts_with('$'))
                    .ok_or_else(|| {
                        ConsoleError::store("the count field must be a non-empty string")
                    })?;
                if records.is_empty() {
                    Vec::new()
                } else {
                    let mut out = Record::new();
                    out.insert(field.to_string(), FieldValue::Int(records.len() as i64));
                    vec![out]
                }
            }
            "$unwind" => unwind(records, spec)?,
            other => {
                return Err(ConsoleError::store(format!(
                    "Unrecognized pipeline stage name: '{}'",
                    other
                )))
            }
        };
    }
    Ok(records)
}

fn stage_shape_error() -> ConsoleError {
    ConsoleError::store("A pipeline stage specification object must contain exactly one field.")
}

fn expect_map<'a>(stage: &str, spec: &'a FieldValue) -> ConsoleResult<&'a Record> {
    spec.as_map()
        .ok_or_else(|| ConsoleError::store(format!("{} specification must be an object", stage)))
}

fn expect_count(stage: &str, spec: &FieldValue) -> ConsoleResult<usize> {
    match spec {
        FieldValue::Int(n) if *n >= 0 => Ok(*n as usize),
        FieldValue::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Ok(*f as usize),
        _ => Err(ConsoleError::store(format!(
            "invalid argument to {} stage: expected a non-negative number",
            stage
        ))),
    }
}

/// Evaluate an expression: `"$path"` reads a field (null when missing),
/// objects and arrays evaluate element-wise, anything else is a literal.
pub fn eval_expr(record: &Record, expr: &FieldValue) -> ConsoleResult<FieldValue> {
    match expr {
        FieldValue::String(s) if s.starts_with('$') => {
            let path = &s[1..];
            if path.is_empty() || path.starts_with('$') {
                return Err(ConsoleError::store(format!("invalid field path '{}'", s)));
            }
            Ok(lookup(record, path).cloned().unwrap_or(FieldValue::Null))
        }
        FieldValue::Map(map) => {
            if let Some(op) = map.keys().find(|k| k.starts_with('$')) {
                return Err(ConsoleError::store(format!(
                    "Unrecognized expression '{}'",
                    op
                )));
            }
            let mut out = Record::new();
            for (k, v) in map {
                out.insert(k.clone(), eval_expr(record, v)?);
            }
            Ok(FieldValue::Map(out))
        }
        FieldValue::List(items) => Ok(FieldValue::List(
            items
                .iter()
                .map(|item| eval_expr(record, item))
                .collect::<ConsoleResult<_>>()?,
        )),
        literal => Ok(literal.clone()),
    }
}

enum Accumulator {
    Sum { ints: i64, floats: f64, saw_float: bool },
    Avg { total: f64, count: u64 },
    Min(Option<FieldValue>),
    Max(Option<FieldValue>),
    First(Option<FieldValue>),
    Last(FieldValue),
    Push(Vec<FieldValue>),
    Count(i64),
}

impl Accumulator {
    fn new(op: &str) -> ConsoleResult<Self> {
        Ok(match op {
            "$sum" => Accumulator::Sum { ints: 0, floats: 0.0, saw_float: false },
            "$avg" => Accumulator::Avg { total: 0.0, count: 0 },
            "$min" => Accumulator::Min(None),
            "$max" => Accumulator::Max(None),
            "$first" => Accumulator::First(None),
            "$last" => Accumulator::Last(FieldValue::Null),
            "$push" => Accumulator::Push(Vec::new()),
            "$count" => Accumulator::Count(0),
            other => {
                return Err(ConsoleError::store(format!(
                    "unknown group operator '{}'",
                    other
                )))
            }
        })
    }

    fn feed(&mut self, value: FieldValue) {
        match self {
            Accumulator::Sum { ints, floats, saw_float } => match value {
                FieldValue::Int(i) => match ints.checked_add(i) {
                    Some(sum) => *ints = sum,
                    None => {
                        *floats += i as f64;
                        *saw_float = true;
                    }
                },
                FieldValue::Float(f) => {
                    *floats += f;
                    *saw_float = true;
                }
                _ => {}
            },
            Accumulator::Avg { total, count } => {
                if let Some(n) = value.as_f64() {
                    *total += n;
                    *count += 1;
                }
            }
            Accumulator::Min(current) => {
                if !value.is_null()
                    && current.as_ref().map_or(true, |c| value.total_cmp(c) == Ordering::Less)
                {
                    *current = Some(value);
                }
            }
            Accumulator::Max(current) => {
                if !value.is_null()
                    && current.as_ref().map_or(true, |c| value.total_cmp(c) == Ordering::Greater)
                {
                    *current = Some(value);
                }
            }
            Accumulator::First(current) => {
                if current.is_none() {
                    *current = Some(value);
                }
            }
            Accumulator::Last(current) => *current = value,
            Accumulator::Push(items) => items.push(value),
            Accumulator::Count(n) => *n += 1,
        }
    }

    fn finish(self) -> FieldValue {
        match self {
            Accumulator::Sum { ints, floats, saw_float } => {
                if saw_float {
                    FieldValue::Float(ints as f64 + floats)
                } else {
                    FieldValue::Int(ints)
                }
            }
            Accumulator::Avg { total, count } => {
                if count == 0 {
                    FieldValue::Null
                } else {
                    FieldValue::Float(total / count as f64)
                }
            }
            Accumulator::Min(v) | Accumulator::Max(v) | Accumulator::First(v) => {
                v.unwrap_or(FieldValue::Null)
            }
            Accumulator::Last(v) => v,
            Accumulator::Push(items) => FieldValue::List(items),
            Accumulator::Count(n) => FieldValue::Int(n),
        }
    }
}

struct GroupState {
    key: FieldValue,
    accumulators: Vec<(String, Accumulator)>,
}

fn group(records: Vec<Record>, spec: &Record) -> ConsoleResult<Vec<Record>> {
    let key_expr = spec.get(ID_FIELD).ok_or_else(|| {
        ConsoleError::store("a group specification must include an _id")
    })?;

    let mut fields: Vec<(&str, &str, &FieldValue)> = Vec::new();
    for (name, acc) in spec.iter().filter(|(k, _)| k.as_str() != ID_FIELD) {
        let (op, arg) = match acc.as_map() {
            Some(m) if m.len() == 1 => m.iter().next().ok_or_else(|| {
                ConsoleError::store(format!("the field '{}' must be an accumulator object", name))
            })?,
            _ => {
                return Err(ConsoleError::store(format!(
                    "the field '{}' must be an accumulator object",
                    name
                )))
            }
        };
        Accumulator::new(op)?;
        fields.push((name.as_str(), op.as_str(), arg));
    }

    let mut groups: Vec<GroupState> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in &records {
        let key = eval_expr(record, key_expr)?;
        let slot = serde_json::to_string(&key).map_err(|e| ConsoleError::store(e.to_string()))?;
        let position = match index.get(&slot) {
            Some(&i) => i,
            None => {
                let accumulators = fields
                    .iter()
                    .map(|(name, op, _)| Ok((name.to_string(), Accumulator::new(op)?)))
                    .collect::<ConsoleResult<_>>()?;
                groups.push(GroupState { key, accumulators });
                index.insert(slot, groups.len() - 1);
                groups.len() - 1
            }
        };
        for ((_, _, arg), (_, acc)) in fields.iter().zip(groups[position].accumulators.iter_mut()) {
            acc.feed(eval_expr(record, arg)?);
        }
    }

    Ok(groups
        .into_iter()
        .map(|state| {
            let mut out = Record::new();
            out.insert(ID_FIELD.to_string(), state.key);
            for (name, acc) in state.accumulators {
                out.insert(name, acc.finish());
            }
            out
        })
        .collect())
}

fn sort(mut records: Vec<Record>, spec: &Record) -> ConsoleResult<Vec<Record>> {
    if spec.is_empty() {
        return Err(ConsoleError::store("$sort stage must have at least one sort key"));
    }
    let mut keys = Vec::with_capacity(spec.len());
    for (path, direction) in spec {
        let descending = match direction.as_f64() {
            Some(d) if d == 1.0 => false,
            Some(d) if d == -1.0 => true,
            _ => {
                return Err(ConsoleError::store(format!(
                    "$sort key ordering for '{}' must be 1 or -1",
                    path
                )))
            }
        };
        keys.push((path.as_str(), descending));
    }

    records.sort_by(|a, b| {
        for (path, descending) in &keys {
            let left = lookup(a, path).unwrap_or(&FieldValue::Null);
            let right = lookup(b, path).unwrap_or(&FieldValue::Null);
            let ordering = left.total_cmp(right);
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(records)
}

fn unwind(records: Vec<Record>, spec: &FieldValue) -> ConsoleResult<Vec<Record>> {
    let path = match spec {
        FieldValue::String(s) => s.as_str(),
        FieldValue::Map(m) => m.get("path").and_then(FieldValue::as_str).unwrap_or(""),
        _ => "",
    };
    let path = path
        .strip_prefix('$')
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ConsoleError::store("$unwind path must be prefixed by a '$'"))?;

    let mut out = Vec::new();
    for record in records {
        match lookup(&record, path).cloned() {
            Some(FieldValue::List(items)) => {
                for item in items {
                    let mut copy = record.clone();
                    crate::update::set_path(&mut copy, path, item)?;
                    out.push(copy);
                }
            }
            Some(FieldValue::Null) | None => {}
            Some(_) => out.push(record),
        }
    }
    Ok(out)
}
