//! Clients for the third-party APIs this exporter draws from.
//!
//! Each submodule talks to exactly one upstream: one GET, one JSON shape,
//! one normalized value out. All requests go through [`SourceClient`],
//! which owns the shared HTTP client, the per-request timeout and the
//! verbose request/response logging used on the first gather cycle.

pub mod ethermine;
pub mod network;
pub mod price;
pub mod two_miners;
pub mod wallet;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::error::SourceError;

/// Total time budget for a single upstream request.
pub const API_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared HTTP client for all source fetchers.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: Client,
    verbose: bool,
}

impl SourceClient {
    /// Builds the underlying HTTP client with the upstream timeout applied.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self {
            http,
            verbose: false,
        })
    }

    /// Returns a handle that logs every request URL and response body.
    ///
    /// Used for the first gather cycle so a misconfigured deployment shows
    /// the failing upstream immediately.
    pub fn verbose(&self) -> Self {
        Self {
            http: self.http.clone(),
            verbose: true,
        }
    }

    /// GET `url` and return the response body as text.
    ///
    /// A non-2xx status is a transport error; the body is returned to the
    /// caller unparsed otherwise.
    pub async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        if self.verbose {
            info!("Fetching {url}");
        }
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::transport(url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::transport(url, e))?;
        if self.verbose {
            debug!("Response from {url}: {}", body.trim());
        }
        if !status.is_success() {
            return Err(SourceError::transport(url, status));
        }
        Ok(body)
    }
}
