use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashboard_aggregator::{DashboardSource, FetchError};
use log::debug;
use serde_json::Value;

/// Reads previously saved API responses from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    demographics: PathBuf,
    adverse_events: PathBuf,
}

impl FileSource {
    pub fn new(demographics: impl Into<PathBuf>, adverse_events: impl Into<PathBuf>) -> Self {
        Self {
            demographics: demographics.into(),
            adverse_events: adverse_events.into(),
        }
    }
}

async fn read_json(path: &Path) -> Result<Value, FetchError> {
    debug!("reading payload from {}", path.display());
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| FetchError::Other(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|err| FetchError::Decode(format!("{}: {err}", path.display())))
}

#[async_trait]
impl DashboardSource for FileSource {
    async fn fetch_demographics(&self) -> Result<Value, FetchError> {
        read_json(&self.demographics).await
    }

    async fn fetch_adverse_events(&self) -> Result<Value, FetchError> {
        read_json(&self.adverse_events).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../dashboard-analytics/tests/data")
            .join(name)
    }

    #[tokio::test]
    async fn reads_saved_payloads() {
        let source = FileSource::new(
            fixture("demographics.json"),
            fixture("adverse_events.json"),
        );

        let demographics = source.fetch_demographics().await.unwrap();
        let adverse_events = source.fetch_adverse_events().await.unwrap();

        assert_eq!(demographics["total_patient_count"], 120);
        assert_eq!(adverse_events["totals"]["total_events"], 80);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let source = FileSource::new(fixture("missing.json"), fixture("adverse_events.json"));

        let err = source.fetch_demographics().await.unwrap_err();
        assert!(matches!(err, FetchError::Other(_)));
    }
}
