//! HTTP client for the showroom stock API.

use crate::catalog::{AttributeFilter, SearchResult};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

pub const STOCK_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Where products come from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Search products matching the non-empty fields of `filter`.
    ///
    /// `Ok(None)` means the source could not answer (transport failure, non-200 status,
    /// unreadable payload). Callers treat it like an empty result.
    async fn search(&self, filter: &AttributeFilter) -> Result<Option<SearchResult>>;
}

/// `GET {base}/products/search` client. Filtering happens server side.
pub struct StockApiClient {
    client: Client,
    search_url: Url,
}

impl StockApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, STOCK_API_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let search_url = Url::parse(&format!("{}/products/search", base_url.trim_end_matches('/')))
            .map_err(|e| AgentError::ConfigError(format!("invalid stock API base '{base_url}': {e}")))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, search_url })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl ProductSource for StockApiClient {
    async fn search(&self, filter: &AttributeFilter) -> Result<Option<SearchResult>> {
        let params = filter.query_params();
        debug!(?params, "Querying stock API");

        let response = match self.client.get(self.search_url.clone()).query(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Stock API request failed: {}", e);
                return Ok(None);
            }
        };

        if response.status() != StatusCode::OK {
            warn!(status = %response.status(), "Stock API returned non-success status");
            return Ok(None);
        }

        match response.json::<SearchResult>().await {
            Ok(result) => {
                debug!(total_found = result.total_found, "Stock API answered");
                Ok(Some(result))
            }
            Err(e) => {
                warn!("Unreadable stock API payload: {}", e);
                Ok(None)
            }
        }
    }
}
