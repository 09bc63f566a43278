//! GBFS (General Bikeshare Feed Specification) client and decoding.
//!
//! A GBFS system publishes a discovery document listing named sub-feeds.
//! This module fetches those documents, decodes the handful of fields the
//! server displays, and resolves feed URLs and translated text.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod resolve;
mod source;
mod types;

pub use client::{GbfsClient, GbfsClientConfig};
pub use error::GbfsError;
pub use resolve::{
    FeedName, ResolveError, display_text, resolve_feed_url, resolve_known_feed,
    resolve_localized_text, select_directory,
};
pub use source::{
    FeedSource, decode, fetch_document, fetch_feeds, fetch_station_information,
    fetch_station_status, fetch_system_information,
};
pub use types::{
    DiscoveryData, Envelope, Feed, Flag, LanguageFeeds, LocalizedText, StationId,
    StationInformation, StationList, StationStatus, SystemInformation, Timestamp, Translation,
};
