//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedGbfsClient;
use crate::cities::CityRegistry;

/// Shared application state.
///
/// Contains all the services needed to handle requests. `S` is the feed
/// source, the cached HTTP client outside of tests.
pub struct AppState<S = CachedGbfsClient> {
    /// Feed source
    pub gbfs: Arc<S>,

    /// Configured networks
    pub cities: Arc<CityRegistry>,

    /// Preferred language for feed text
    pub language: Option<Arc<str>>,
}

impl<S> AppState<S> {
    /// Create a new app state.
    pub fn new(gbfs: S, cities: CityRegistry, language: Option<String>) -> Self {
        Self {
            gbfs: Arc::new(gbfs),
            cities: Arc::new(cities),
            language: language.map(Arc::from),
        }
    }

    /// The preferred language as a borrowed string.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            gbfs: Arc::clone(&self.gbfs),
            cities: Arc::clone(&self.cities),
            language: self.language.clone(),
        }
    }
}
