//! Scalar KPIs derived from normalized series.
//!
//! Each metric owns its degenerate-input rule: average age and gender ratio
//! fall back to `"N/A"`, percentages become absent when the total is zero,
//! and a trend delta over a non-positive previous period is `0`.

use dashboard_core::{MetricValue, SeriesPoint, TrendPoint};
use serde_json::Value;

use crate::series::coerce_number;

/// Rounds half away from zero to `decimals` places.
///
/// Values too large to scale are returned as-is, so a finite input always
/// rounds to a finite output.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    // `+ 0.0` turns -0.0 into 0.0
    if !scaled.is_finite() {
        return value + 0.0;
    }
    scaled.round() / factor + 0.0
}

/// Count-weighted mean over raw `{value, count}` age rows, one decimal.
///
/// Only rows where both fields are numbers contribute.
pub fn average_age(rows: &Value) -> MetricValue {
    let Some(rows) = rows.as_array() else {
        return MetricValue::NotAvailable;
    };

    let (weighted, total) = rows
        .iter()
        .filter_map(|row| {
            let age = row.get("value").and_then(coerce_number)?;
            let count = row.get("count").and_then(coerce_number)?;
            Some((age, count))
        })
        .fold((0.0, 0.0), |(weighted, total), (age, count)| {
            (weighted + age * count, total + count)
        });

    if total <= 0.0 {
        return MetricValue::NotAvailable;
    }

    MetricValue::from_finite(round_to(weighted / total, 1))
}

/// Male-to-female ratio, two decimals. `"N/A"` without any female count.
pub fn gender_ratio(gender: &[SeriesPoint]) -> MetricValue {
    let male = count_ignore_case(gender, "male");
    let female = count_ignore_case(gender, "female");

    if female == 0.0 {
        return MetricValue::NotAvailable;
    }

    MetricValue::from_finite(round_to(male / female, 2))
}

/// `part / total` as a percentage, one decimal. Absent when `total` is zero.
pub fn percentage_of_total(part: f64, total: f64) -> Option<f64> {
    if total == 0.0 {
        return None;
    }

    let percent = part / total * 100.0;
    percent.is_finite().then(|| round_to(percent, 1))
}

/// Percent change between the last two points, one decimal.
///
/// Absent with fewer than two points. A previous period that is not
/// positive yields `0` rather than an absent value.
pub fn trend_delta(points: &[TrendPoint]) -> Option<f64> {
    let [.., previous, latest] = points else {
        return None;
    };

    if previous.count <= 0.0 {
        return Some(0.0);
    }

    let delta = (latest.count - previous.count) / previous.count * 100.0;
    if delta.is_finite() {
        Some(round_to(delta, 1))
    } else {
        Some(0.0)
    }
}

/// Count of the most recent period, `0` for an empty trend.
pub fn latest_count(points: &[TrendPoint]) -> f64 {
    points.last().map(|point| point.count).unwrap_or(0.0)
}

/// Value of the first point labelled exactly `label`, else `0`.
pub fn count_for(series: &[SeriesPoint], label: &str) -> f64 {
    series
        .iter()
        .find(|point| point.label == label)
        .map(|point| point.value)
        .unwrap_or(0.0)
}

fn count_ignore_case(series: &[SeriesPoint], label: &str) -> f64 {
    series
        .iter()
        .find(|point| point.label.to_lowercase() == label)
        .map(|point| point.value)
        .unwrap_or(0.0)
}
