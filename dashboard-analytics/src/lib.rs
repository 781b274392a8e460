//! Analytics API payloads to chart-ready `DashboardSnapshot` views.
//!
//! Every subtree of the upstream JSON is optional; whatever is missing
//! becomes an empty series or a zero, never an error.

pub mod age;
pub mod metrics;
pub mod series;

use dashboard_core::{
    AdverseEventsKpis, AdverseEventsView, DashboardConfig, DashboardError, DashboardSnapshot,
    DemographicsKpis, DemographicsView, SeriesPoint,
};
use log::debug;
use serde_json::Value;

pub use age::bin_ages;
pub use metrics::{average_age, gender_ratio, percentage_of_total, round_to, trend_delta};
pub use series::{extract_series, extract_trend, group_trends, SeriesKeys};

static NULL: Value = Value::Null;

/// Builds a snapshot from the two raw JSON bodies.
pub fn build_snapshot_str(
    demographics_json: &str,
    adverse_events_json: &str,
    config: &DashboardConfig,
) -> Result<DashboardSnapshot, DashboardError> {
    let demographics: Value = serde_json::from_str(demographics_json)
        .map_err(|err| DashboardError::Parse(format!("demographics: {err}")))?;
    let adverse_events: Value = serde_json::from_str(adverse_events_json)
        .map_err(|err| DashboardError::Parse(format!("adverse events: {err}")))?;

    Ok(build_snapshot_value(&demographics, &adverse_events, config))
}

/// Builds a snapshot from already decoded payloads.
pub fn build_snapshot_value(
    demographics: &Value,
    adverse_events: &Value,
    config: &DashboardConfig,
) -> DashboardSnapshot {
    DashboardSnapshot::new(
        summarize_demographics(demographics),
        summarize_adverse_events(adverse_events, config),
    )
}

/// Normalizes a `patient_demog` payload.
pub fn summarize_demographics(payload: &Value) -> DemographicsView {
    let ages = field(payload, &["age_distribution"]);
    let gender = SeriesKeys::LABEL_COUNT.extract(field(payload, &["gender_distribution"]));
    let registration_trend = extract_trend(field(payload, &["registration_trends", "overall"]));

    let kpis = DemographicsKpis {
        total_patients: number(payload, &["total_patient_count"]),
        average_age: average_age(ages),
        gender_ratio: gender_ratio(&gender),
        latest_registrations: metrics::latest_count(&registration_trend),
        registration_delta_pct: trend_delta(&registration_trend),
    };

    let view = DemographicsView {
        kpis,
        gender,
        age_bins: bin_ages(ages),
        registration_by_country: group_trends(
            field(payload, &["registration_trends", "by_country"]),
            "country",
        ),
        registration_by_locale: group_trends(
            field(payload, &["registration_trends", "by_locale"]),
            "locale",
        ),
        registration_trend,
        top_cities: SeriesKeys::CITY_COUNT.extract(field(payload, &["geography", "top_cities"])),
        locales: SeriesKeys::LOCALE_COUNT
            .extract(field(payload, &["geography", "locale_breakdown"])),
        avg_age_by_country: rounded(SeriesKeys::COUNTRY_AVG_AGE.extract(field(
            payload,
            &["cross_cutting", "avg_age_by_country"],
        ))),
        avg_bmi_by_marital_status: rounded(SeriesKeys::MARITAL_STATUS_AVG_BMI.extract(field(
            payload,
            &["cross_cutting", "avg_bmi_by_marital_status"],
        ))),
    };

    debug!(
        "demographics normalized: {} gender rows, {} registration periods, {} cities",
        view.gender.len(),
        view.registration_trend.len(),
        view.top_cities.len()
    );

    view
}

/// Normalizes an `adverse_event` payload.
pub fn summarize_adverse_events(payload: &Value, config: &DashboardConfig) -> AdverseEventsView {
    let by_severity =
        SeriesKeys::LABEL_COUNT.extract(field(payload, &["distributions", "by_severity"]));
    let over_time = extract_trend(field(payload, &["over_time"]));

    let total_events = number(payload, &["totals", "total_events"]);
    let ongoing_events = number(payload, &["totals", "total_ongoing_events"]);
    let critical_events = metrics::count_for(&by_severity, &config.critical_severity_label);

    let kpis = AdverseEventsKpis {
        total_events,
        ongoing_events,
        average_resolution_days: round_to(
            number(payload, &["totals", "average_time_to_resolution_days"]),
            2,
        ),
        ongoing_pct: percentage_of_total(ongoing_events, total_events),
        critical_events,
        critical_pct: percentage_of_total(critical_events, total_events),
        occurrence_delta_pct: trend_delta(&over_time),
    };

    let view = AdverseEventsView {
        kpis,
        by_type: SeriesKeys::LABEL_COUNT.extract(field(payload, &["distributions", "by_type"])),
        by_severity,
        by_location: SeriesKeys::LABEL_COUNT
            .extract(field(payload, &["distributions", "by_location"])),
        over_time,
    };

    debug!(
        "adverse events normalized: {} types, {} severities, {} periods",
        view.by_type.len(),
        view.by_severity.len(),
        view.over_time.len()
    );

    view
}

/// Walks `path` through nested objects, `null` when any step is missing.
fn field<'a>(value: &'a Value, path: &[&str]) -> &'a Value {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .unwrap_or(&NULL)
}

fn number(value: &Value, path: &[&str]) -> f64 {
    series::coerce_number(field(value, path)).unwrap_or(0.0)
}

fn rounded(mut points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    for point in &mut points {
        point.value = round_to(point.value, 1);
    }
    points
}
