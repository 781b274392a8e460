use std::time::Duration;

use async_trait::async_trait;
use dashboard_core::DashboardConfig;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use crate::source::{DashboardSource, Endpoint, FetchError};

/// `DashboardSource` backed by the analytics REST API.
#[derive(Debug, Clone)]
pub struct HttpDashboardSource {
    client: Client,
    base_url: String,
}

impl HttpDashboardSource {
    pub fn new(config: &DashboardConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Uses a preconfigured client; only the base URL is read from `config`.
    pub fn with_client(client: Client, config: &DashboardConfig) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get_json(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let url = self.url(endpoint);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {url} returned {status}");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

#[async_trait]
impl DashboardSource for HttpDashboardSource {
    async fn fetch_demographics(&self) -> Result<Value, FetchError> {
        self.get_json(Endpoint::Demographics).await
    }

    async fn fetch_adverse_events(&self) -> Result<Value, FetchError> {
        self.get_json(Endpoint::AdverseEvents).await
    }
}
