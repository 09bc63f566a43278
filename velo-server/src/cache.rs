//! Caching layer for GBFS responses.
//!
//! Every page view fetches a discovery document and three sub-feeds. Bodies
//! are cached by request URL so that a burst of views of the same city hits
//! each publisher once per TTL. GBFS documents carry their own `ttl`, but
//! most publishers set it to a minute or less, so a single server-wide TTL
//! is used instead.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::gbfs::{FeedSource, GbfsClient, GbfsError};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 500,
        }
    }
}

/// A feed source with a response cache in front of it.
///
/// Only successful responses are cached. Concurrent requests for the same
/// URL share a single upstream fetch.
pub struct CachedSource<S> {
    source: S,
    bodies: MokaCache<String, Arc<str>>,
}

/// The GBFS HTTP client with caching, as used by the server.
pub type CachedGbfsClient = CachedSource<GbfsClient>;

impl<S: FeedSource> CachedSource<S> {
    /// Create a new cached source.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let bodies = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { source, bodies }
    }

    /// Access the underlying source for fetches that bypass the cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.bodies.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.bodies.invalidate_all();
    }
}

impl<S: FeedSource + Send> FeedSource for CachedSource<S> {
    async fn fetch_text(&self, url: &str) -> Result<Arc<str>, GbfsError> {
        self.bodies
            .try_get_with_by_ref(url, async {
                let body = self.source.fetch_text(url).await?;
                debug!(%url, bytes = body.len(), "caching GBFS document");
                Ok::<_, GbfsError>(body)
            })
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(GbfsError::Shared))
    }
}
