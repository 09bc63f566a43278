//! GBFS HTTP client.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::error::GbfsError;
use super::source::FeedSource;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest error body kept in [`GbfsError::Api`].
const MAX_ERROR_BODY: usize = 500;

/// Configuration for the GBFS client.
#[derive(Debug, Clone)]
pub struct GbfsClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// `User-Agent` sent to publishers
    pub user_agent: String,
}

impl GbfsClientConfig {
    /// Create a config with the default timeout and user agent.
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("velo-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for GbfsClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Uncached GBFS client.
///
/// Publishers are public and unauthenticated; API keys, where needed, are
/// part of the configured discovery URL.
#[derive(Debug, Clone)]
pub struct GbfsClient {
    http: reqwest::Client,
}

impl GbfsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GbfsClientConfig) -> Result<Self, GbfsError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    /// Fetch a document body.
    pub async fn get_text(&self, url: &str) -> Result<String, GbfsError> {
        debug!(%url, "fetching GBFS document");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GbfsError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

impl FeedSource for GbfsClient {
    async fn fetch_text(&self, url: &str) -> Result<Arc<str>, GbfsError> {
        self.get_text(url).await.map(Arc::from)
    }
}
