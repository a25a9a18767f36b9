//! Remote feed fetcher
//!
//! Retrieves the two CSV feeds over unauthenticated HTTP GET. The pair fetch
//! is atomic: if either feed fails, the whole cycle is reported as failed and
//! the sync engine substitutes the demo dataset. No partial dataset
//! (appointments-only or inventory-only) is ever surfaced.

use crate::config::FeedConfig;
use crate::error::{DonorSrvError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// The two independent feed resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Appointments,
    Inventory,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Appointments => write!(f, "appointments"),
            FeedKind::Inventory => write!(f, "inventory"),
        }
    }
}

/// Read channel for raw feed text
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw CSV text of one feed.
    async fn fetch(&self, kind: FeedKind) -> Result<String>;
}

/// HTTP-backed feed source
pub struct HttpFeedSource {
    client: reqwest::Client,
    appointments_url: String,
    inventory_url: String,
}

impl HttpFeedSource {
    /// Build a client from feed configuration.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DonorSrvError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            appointments_url: config.appointments_url.clone(),
            inventory_url: config.inventory_url.clone(),
        })
    }

    fn url_for(&self, kind: FeedKind) -> &str {
        match kind {
            FeedKind::Appointments => &self.appointments_url,
            FeedKind::Inventory => &self.inventory_url,
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, kind: FeedKind) -> Result<String> {
        let url = self.url_for(kind);
        debug!("Fetching {} feed from {}", kind, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DonorSrvError::transport(kind, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DonorSrvError::transport(
                kind,
                Some(status.as_u16()),
                format!("unexpected response status {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| DonorSrvError::transport(kind, None, e.to_string()))
    }
}

/// Fetch both feeds concurrently.
///
/// Join semantics: the first failure does not cancel the other in-flight
/// request, but either failure fails the pair.
pub async fn fetch_both(source: &dyn FeedSource) -> Result<(String, String)> {
    let (appointments, inventory) = tokio::join!(
        source.fetch(FeedKind::Appointments),
        source.fetch(FeedKind::Inventory),
    );
    Ok((appointments?, inventory?))
}
