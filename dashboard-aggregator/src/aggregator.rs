use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashboard_analytics::build_snapshot_value;
use dashboard_core::{DashboardConfig, DashboardError, DashboardSnapshot};
use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::watch;

use crate::source::{DashboardSource, Endpoint, FetchError};

/// The snapshot currently shown, tagged with the refresh that produced it.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub ticket: u64,
    pub snapshot: Option<Arc<DashboardSnapshot>>,
}

/// Result of a refresh that did not fail.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Published(Arc<DashboardSnapshot>),
    /// A newer refresh started while this one was in flight; its result was dropped.
    Superseded,
}

/// Fetches both payloads concurrently and publishes whole snapshots.
pub struct Aggregator {
    source: Arc<dyn DashboardSource>,
    config: DashboardConfig,
    latest_ticket: AtomicU64,
    published: watch::Sender<Published>,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("source", &"<DashboardSource>")
            .field("config", &self.config)
            .field("latest_ticket", &self.latest_ticket)
            .finish()
    }
}

impl Aggregator {
    pub fn new(source: Arc<dyn DashboardSource>, config: DashboardConfig) -> Self {
        let (published, _) = watch::channel(Published::default());
        Self {
            source,
            config,
            latest_ticket: AtomicU64::new(0),
            published,
        }
    }

    /// Loads both payloads and derives a snapshot without publishing it.
    ///
    /// Fails as a whole as soon as either retrieval fails.
    pub async fn load_snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let (demographics, adverse_events) = tokio::try_join!(
            fetch(Endpoint::Demographics, self.source.fetch_demographics()),
            fetch(Endpoint::AdverseEvents, self.source.fetch_adverse_events()),
        )?;

        Ok(build_snapshot_value(
            &demographics,
            &adverse_events,
            &self.config,
        ))
    }

    /// Loads a snapshot and makes it the current one.
    ///
    /// Results of refreshes overtaken by a newer call are discarded. On error
    /// the previously published snapshot stays in place.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DashboardError> {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("refresh #{ticket} started");

        let snapshot = match self.load_snapshot().await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                warn!("refresh #{ticket} failed: {err}");
                return Err(err);
            }
        };

        if self.latest_ticket.load(Ordering::SeqCst) != ticket {
            info!("refresh #{ticket} superseded, discarding result");
            return Ok(RefreshOutcome::Superseded);
        }

        let accepted = self.published.send_if_modified(|current| {
            if ticket <= current.ticket {
                return false;
            }
            *current = Published {
                ticket,
                snapshot: Some(Arc::clone(&snapshot)),
            };
            true
        });

        if accepted {
            info!("refresh #{ticket} published");
            Ok(RefreshOutcome::Published(snapshot))
        } else {
            info!("refresh #{ticket} superseded, discarding result");
            Ok(RefreshOutcome::Superseded)
        }
    }

    /// Last published snapshot, if any refresh has succeeded.
    pub fn current(&self) -> Option<Arc<DashboardSnapshot>> {
        self.published.borrow().snapshot.clone()
    }

    /// Change notifications for presentation code.
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.published.subscribe()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

async fn fetch<F>(endpoint: Endpoint, request: F) -> Result<Value, DashboardError>
where
    F: Future<Output = Result<Value, FetchError>>,
{
    request.await.map_err(|err| {
        warn!("fetching {endpoint} failed: {err}");
        DashboardError::Unavailable {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    })
}
