//! Fetching and decoding GBFS documents from any body source.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::GbfsError;
use super::resolve::select_directory;
use super::types::{
    DiscoveryData, Envelope, Feed, StationInformation, StationList, StationStatus,
    SystemInformation,
};

/// Something that can return the body of a GBFS document by URL.
///
/// Implemented by the HTTP client, the cached client, and test doubles.
pub trait FeedSource: Sync {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<Arc<str>, GbfsError>> + Send;
}

/// Decode a document body, keeping the URL for error reporting.
pub fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, GbfsError> {
    serde_json::from_str(body).map_err(|e| GbfsError::Json {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Fetch and decode any GBFS document.
pub async fn fetch_document<S, T>(source: &S, url: &str) -> Result<Envelope<T>, GbfsError>
where
    S: FeedSource,
    T: DeserializeOwned,
{
    let body = source.fetch_text(url).await?;
    decode(url, &body)
}

/// Fetch a discovery document and return its feed directory.
pub async fn fetch_feeds<S: FeedSource>(
    source: &S,
    discovery_url: &str,
    preferred_language: Option<&str>,
) -> Result<Vec<Feed>, GbfsError> {
    let discovery: Envelope<DiscoveryData> = fetch_document(source, discovery_url).await?;
    let feeds = select_directory(discovery.data, preferred_language)?;
    debug!(url = discovery_url, feeds = feeds.len(), "resolved feed directory");
    Ok(feeds)
}

pub async fn fetch_system_information<S: FeedSource>(
    source: &S,
    url: &str,
) -> Result<Envelope<SystemInformation>, GbfsError> {
    fetch_document(source, url).await
}

pub async fn fetch_station_information<S: FeedSource>(
    source: &S,
    url: &str,
) -> Result<Envelope<StationList<StationInformation>>, GbfsError> {
    fetch_document(source, url).await
}

pub async fn fetch_station_status<S: FeedSource>(
    source: &S,
    url: &str,
) -> Result<Envelope<StationList<StationStatus>>, GbfsError> {
    fetch_document(source, url).await
}
