//! Chart-ready numeric series.

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, ConsoleResult};
use crate::value::{lookup, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
    pub points: Vec<SeriesPoint>,
}

/// One point per record: the x-field gives the label (empty when absent),
/// the y-field must be numeric in every record.
pub fn to_chart_series(
    records: &[Record],
    x_field: &str,
    y_field: &str,
    kind: ChartKind,
) -> ConsoleResult<ChartSeries> {
    if x_field.trim().is_empty() {
        return Err(ConsoleError::validation("x field is required"));
    }
    if y_field.trim().is_empty() {
        return Err(ConsoleError::validation("y field is required"));
    }

    let mut points = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let value = match lookup(record, y_field) {
            Some(v) => v.as_f64().ok_or_else(|| {
                ConsoleError::field(format!(
                    "field '{}' is {} in record {}, expected a number",
                    y_field,
                    v.type_name(),
                    index
                ))
            })?,
            None => {
                return Err(ConsoleError::field(format!(
                    "field '{}' is missing in record {}",
                    y_field, index
                )))
            }
        };
        let label = lookup(record, x_field)
            .map(|v| v.display_text())
            .unwrap_or_default();
        points.push(SeriesPoint { label, value });
    }

    Ok(ChartSeries {
        kind,
        x_field: x_field.to_string(),
        y_field: y_field.to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn records(json: &str) -> Vec<Record> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_one_point_per_record() {
        let data = records(r#"[{"name": "A", "n": 1}, {"name": "B", "n": 2.5}, {"n": 0}]"#);
        let series = to_chart_series(&data, "name", "n", ChartKind::Bar).unwrap();
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points[1], SeriesPoint { label: "B".into(), value: 2.5 });
        assert_eq!(series.points[2].label, "");
    }

    #[test]
    fn test_non_numeric_y_is_field_error() {
        let data = records(r#"[{"name": "A", "n": 1}, {"name": "B", "n": "two"}]"#);
        let err = to_chart_series(&data, "name", "n", ChartKind::Line).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldError);
        assert!(err.message().contains("record 1"));
    }

    #[test]
    fn test_missing_y_is_field_error() {
        let data = records(r#"[{"name": "A"}]"#);
        let err = to_chart_series(&data, "name", "n", ChartKind::Pie).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldError);
    }

    #[test]
    fn test_blank_field_names_are_validation_errors() {
        let err = to_chart_series(&[], "", "n", ChartKind::Bar).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_nested_y_field() {
        let data = records(r#"[{"city": "Lyon", "stats": {"pop": 500}}]"#);
        let series = to_chart_series(&data, "city", "stats.pop", ChartKind::Pie).unwrap();
        assert_eq!(series.points[0].value, 500.0);
    }
}
