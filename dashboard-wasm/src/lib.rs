//! Framework-neutral WASM <-> JavaScript bridge for the dashboard normalization layer.

use dashboard_core::DashboardConfig;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsDashboardConfig {
    #[serde(default)]
    critical_severity_label: Option<String>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(label) = cfg.critical_severity_label {
            base.critical_severity_label = label;
        }
        base
    }
}

/// Builds a full snapshot from the two API responses already fetched by the page.
#[wasm_bindgen(js_name = buildSnapshot)]
pub fn build_snapshot(
    demographics: JsValue,
    adverse_events: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let demographics = read_payload(demographics, "demographics")?;
    let adverse_events = read_payload(adverse_events, "adverse events")?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            DashboardConfig::from(cfg)
        }
        None => DashboardConfig::default(),
    };

    let snapshot =
        dashboard_analytics::build_snapshot_value(&demographics, &adverse_events, &cfg);

    to_js(&snapshot, "snapshot")
}

/// Decade histogram for a raw `age_distribution` array.
#[wasm_bindgen(js_name = binAges)]
pub fn bin_ages(rows: JsValue) -> Result<JsValue, JsValue> {
    let rows = read_payload(rows, "age rows")?;
    to_js(&dashboard_analytics::bin_ages(&rows), "bins")
}

/// `{label, value}` pairs read with the given key names.
#[wasm_bindgen(js_name = extractSeries)]
pub fn extract_series(
    rows: JsValue,
    label_key: &str,
    value_key: &str,
) -> Result<JsValue, JsValue> {
    let rows = read_payload(rows, "rows")?;
    to_js(
        &dashboard_analytics::extract_series(&rows, label_key, value_key),
        "series",
    )
}

/// `undefined`/`null` arrive as JSON null so every payload stays optional.
fn read_payload(value: JsValue, name: &str) -> Result<serde_json::Value, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(serde_json::Value::Null);
    }
    from_value::<serde_json::Value>(value)
        .map_err(|err| JsValue::from_str(&format!("Could not read {name} JSON: {err}")))
}

/// Absent metrics become `null` rather than `undefined`.
fn to_js<T: Serialize>(value: &T, name: &str) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Could not serialize {name}: {err}")))
}
