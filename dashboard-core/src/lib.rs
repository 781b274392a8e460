//! Shared model for the clinical analytics dashboard: chart-ready series, KPIs and the snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text used wherever a metric has no defined value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Number of decade buckets in the age histogram, the last one open-ended.
pub const AGE_BIN_COUNT: usize = 11;

/// Settings shared by the normalization layer and the data sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the analytics API, without the `/patient_info` prefix.
    pub api_base_url: String,
    /// Per-request timeout for upstream calls.
    pub request_timeout_secs: u64,
    /// Severity label counted as a critical adverse event (exact match).
    pub critical_severity_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
            critical_severity_label: "Critical".to_string(),
        }
    }
}

/// One category of a categorical chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// One decade bucket of the age histogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeBin {
    pub label: String,
    pub count: f64,
}

/// A period/count sample; sequences are kept in the order the API sends them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub period: String,
    pub count: f64,
}

/// A named trend line, e.g. registrations of one country.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<TrendPoint>,
}

/// A scalar KPI that is either a number or the `"N/A"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    NotAvailable,
}

impl MetricValue {
    /// Wraps `value`, mapping non-finite input to the sentinel.
    pub fn from_finite(value: f64) -> Self {
        if value.is_finite() {
            MetricValue::Value(value)
        } else {
            MetricValue::NotAvailable
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Value(value) => Some(*value),
            MetricValue::NotAvailable => None,
        }
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::NotAvailable
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(value) => write!(f, "{value}"),
            MetricValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetricValue::Value(value) => serializer.serialize_f64(*value),
            MetricValue::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(MetricValue::from_finite(value)),
            Raw::Text(text) if text == NOT_AVAILABLE => Ok(MetricValue::NotAvailable),
            Raw::Text(other) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{NOT_AVAILABLE}\", received \"{other}\""
            ))),
        }
    }
}

/// Headline numbers of the demographics page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DemographicsKpis {
    pub total_patients: f64,
    pub average_age: MetricValue,
    pub gender_ratio: MetricValue,
    pub latest_registrations: f64,
    /// Percent change between the last two registration periods.
    pub registration_delta_pct: Option<f64>,
}

/// Chart-ready view of the `patient_demog` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DemographicsView {
    pub kpis: DemographicsKpis,
    pub gender: Vec<SeriesPoint>,
    pub age_bins: Vec<AgeBin>,
    pub registration_trend: Vec<TrendPoint>,
    #[serde(default)]
    pub registration_by_country: Vec<TrendSeries>,
    #[serde(default)]
    pub registration_by_locale: Vec<TrendSeries>,
    pub top_cities: Vec<SeriesPoint>,
    pub locales: Vec<SeriesPoint>,
    pub avg_age_by_country: Vec<SeriesPoint>,
    pub avg_bmi_by_marital_status: Vec<SeriesPoint>,
}

/// Headline numbers of the adverse events page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AdverseEventsKpis {
    pub total_events: f64,
    pub ongoing_events: f64,
    pub average_resolution_days: f64,
    pub ongoing_pct: Option<f64>,
    pub critical_events: f64,
    pub critical_pct: Option<f64>,
    /// Percent change between the last two occurrence periods.
    pub occurrence_delta_pct: Option<f64>,
}

/// Chart-ready view of the `adverse_event` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AdverseEventsView {
    pub kpis: AdverseEventsKpis,
    pub by_type: Vec<SeriesPoint>,
    pub by_severity: Vec<SeriesPoint>,
    pub by_location: Vec<SeriesPoint>,
    pub over_time: Vec<TrendPoint>,
}

/// Everything the dashboard shows for one refresh, derived from one response pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub demographics: DemographicsView,
    pub adverse_events: AdverseEventsView,
}

impl DashboardSnapshot {
    pub fn new(demographics: DemographicsView, adverse_events: AdverseEventsView) -> Self {
        Self {
            generated_at: Utc::now(),
            demographics,
            adverse_events,
        }
    }

    pub fn demographics(&self) -> &DemographicsView {
        &self.demographics
    }

    pub fn adverse_events(&self) -> &AdverseEventsView {
        &self.adverse_events
    }
}

/// Failures surfaced to the presentation layer.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Could not read payload: {0}")]
    Parse(String),
    #[error("Data unavailable from {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },
}

/// Snapshot with every series empty (placeholder state and tests).
pub fn empty_snapshot() -> DashboardSnapshot {
    DashboardSnapshot::new(DemographicsView::default(), AdverseEventsView::default())
}
