use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// The two upstream resources a snapshot is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Demographics,
    AdverseEvents,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Demographics => "/patient_info/patient_demog",
            Endpoint::AdverseEvents => "/patient_info/adverse_event",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Transport-level failure of a single retrieval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

/// Where the raw dashboard payloads come from.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Raw `patient_demog` payload.
    async fn fetch_demographics(&self) -> Result<Value, FetchError>;

    /// Raw `adverse_event` payload.
    async fn fetch_adverse_events(&self) -> Result<Value, FetchError>;
}
