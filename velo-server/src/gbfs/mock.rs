//! In-memory feed source for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::error::GbfsError;
use super::source::FeedSource;

/// Serves fixed bodies by URL and answers 404 for anything else.
#[derive(Debug, Default)]
pub struct MockFeedSource {
    bodies: HashMap<String, Arc<str>>,
    requests: AtomicUsize,
    delay: Option<Duration>,
}

impl MockFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body for a URL.
    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), Arc::from(body));
        self
    }

    /// Answer every fetch after `delay`, so that requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches served so far, including misses.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl FeedSource for MockFeedSource {
    async fn fetch_text(&self, url: &str) -> Result<Arc<str>, GbfsError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.bodies.get(url).cloned().ok_or_else(|| GbfsError::Api {
            url: url.to_string(),
            status: 404,
            message: "Not Found".to_string(),
        })
    }
}
