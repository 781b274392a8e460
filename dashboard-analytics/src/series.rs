//! Label/value extraction over loosely shaped JSON rows.

use std::collections::HashMap;

use dashboard_core::{SeriesPoint, TrendPoint, TrendSeries};
use serde_json::Value;

/// Field names used to read one kind of distribution row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesKeys {
    pub label: &'static str,
    pub value: &'static str,
}

impl SeriesKeys {
    pub const LABEL_COUNT: SeriesKeys = SeriesKeys::new("label", "count");
    pub const CITY_COUNT: SeriesKeys = SeriesKeys::new("city", "count");
    pub const LOCALE_COUNT: SeriesKeys = SeriesKeys::new("locale", "count");
    pub const COUNTRY_AVG_AGE: SeriesKeys = SeriesKeys::new("country", "avg_age");
    pub const MARITAL_STATUS_AVG_BMI: SeriesKeys = SeriesKeys::new("marital_status", "avg_bmi");
    pub const PERIOD_COUNT: SeriesKeys = SeriesKeys::new("period", "count");

    pub const fn new(label: &'static str, value: &'static str) -> Self {
        Self { label, value }
    }

    pub fn extract(self, rows: &Value) -> Vec<SeriesPoint> {
        extract_series(rows, self.label, self.value)
    }
}

/// Reads `label_key`/`value_key` from every row, keeping input order.
///
/// Non-array input is an empty series. Missing labels become `""` and
/// missing or non-numeric values become `0`; no row is dropped.
pub fn extract_series(rows: &Value, label_key: &str, value_key: &str) -> Vec<SeriesPoint> {
    let Some(rows) = rows.as_array() else {
        return Vec::new();
    };

    rows.iter()
        .map(|row| SeriesPoint {
            label: label_text(row.get(label_key)),
            value: row.get(value_key).and_then(coerce_number).unwrap_or(0.0),
        })
        .collect()
}

/// Period/count rows as a trend line, in the order received.
pub fn extract_trend(rows: &Value) -> Vec<TrendPoint> {
    SeriesKeys::PERIOD_COUNT
        .extract(rows)
        .into_iter()
        .map(|point| TrendPoint {
            period: point.label,
            count: point.value,
        })
        .collect()
}

/// Splits `{period, <group_key>, count}` rows into one trend line per group.
///
/// Groups appear in first-seen order and points keep their input order.
pub fn group_trends(rows: &Value, group_key: &str) -> Vec<TrendSeries> {
    let Some(rows) = rows.as_array() else {
        return Vec::new();
    };

    let mut series: Vec<TrendSeries> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let name = label_text(row.get(group_key));
        let point = TrendPoint {
            period: label_text(row.get("period")),
            count: row.get("count").and_then(coerce_number).unwrap_or(0.0),
        };

        let index = *positions.entry(name.clone()).or_insert_with(|| {
            series.push(TrendSeries {
                name,
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[index].points.push(point);
    }

    series
}

/// Interprets a JSON scalar as a finite number.
///
/// Numbers pass through, strings are trimmed and parsed. Blank strings,
/// other JSON types and non-finite results are not numbers.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// Display text of a label field.
pub fn label_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_aliased_label_key() {
        let rows = json!([{ "city": "NYC", "count": 10 }]);
        let series = extract_series(&rows, "city", "count");

        assert_eq!(
            series,
            vec![SeriesPoint {
                label: "NYC".to_string(),
                value: 10.0
            }]
        );
    }

    #[test]
    fn empty_record_yields_placeholder_point() {
        let series = extract_series(&json!([{}]), "city", "count");

        assert_eq!(
            series,
            vec![SeriesPoint {
                label: String::new(),
                value: 0.0
            }]
        );
    }

    #[test]
    fn non_array_input_is_empty() {
        assert!(extract_series(&Value::Null, "label", "count").is_empty());
        assert!(extract_series(&json!({ "label": "x" }), "label", "count").is_empty());
    }

    #[test]
    fn keeps_input_order_and_zeroes_bad_values() {
        let rows = json!([
            { "label": "Mild", "count": "12" },
            { "label": "Severe", "count": "lots" },
            { "label": "Moderate", "count": null },
            { "label": 3, "count": 4.5 }
        ]);

        let series = SeriesKeys::LABEL_COUNT.extract(&rows);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();

        assert_eq!(labels, vec!["Mild", "Severe", "Moderate", "3"]);
        assert_eq!(values, vec![12.0, 0.0, 0.0, 4.5]);
    }

    #[test]
    fn averages_use_value_alias() {
        let rows = json!([{ "marital_status": "Single", "avg_bmi": 24.7 }]);
        let series = SeriesKeys::MARITAL_STATUS_AVG_BMI.extract(&rows);

        assert_eq!(series[0].label, "Single");
        assert_eq!(series[0].value, 24.7);
    }

    #[test]
    fn trend_points_keep_period_order() {
        let rows = json!([
            { "period": "2024-02", "count": 3 },
            { "period": "2024-01", "count": 5 }
        ]);

        let trend = extract_trend(&rows);
        assert_eq!(trend[0].period, "2024-02");
        assert_eq!(trend[1].count, 5.0);
    }

    #[test]
    fn groups_trends_in_first_seen_order() {
        let rows = json!([
            { "period": "2024-01", "country": "US", "count": 4 },
            { "period": "2024-01", "country": "CA", "count": 2 },
            { "period": "2024-02", "country": "US", "count": 6 },
            { "period": "2024-02", "count": 1 }
        ]);

        let grouped = group_trends(&rows, "country");
        let names: Vec<&str> = grouped.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["US", "CA", ""]);
        assert_eq!(grouped[0].points.len(), 2);
        assert_eq!(grouped[0].points[1].period, "2024-02");
        assert_eq!(grouped[0].points[1].count, 6.0);
    }

    #[test]
    fn coercion_rejects_blank_and_non_finite_text() {
        assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_number(&json!("-3")), Some(-3.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&Value::Null), None);
    }
}
