//! Concurrent retrieval of the dashboard payloads and snapshot publication.

mod aggregator;
mod http;
mod source;

pub use aggregator::{Aggregator, Published, RefreshOutcome};
pub use http::HttpDashboardSource;
pub use source::{DashboardSource, Endpoint, FetchError};
