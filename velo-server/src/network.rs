//! One city's network as seen at a point in time.
//!
//! Loading a snapshot resolves the discovery document, fetches the three
//! sub-feeds, and joins `station_information` with `station_status` on
//! `station_id`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::gbfs::{
    self, Envelope, FeedName, FeedSource, GbfsError, StationId, StationInformation, StationList,
    StationStatus, SystemInformation, display_text, resolve_known_feed,
};
use crate::geo::{Nearest, Point, nearest};

/// Live availability of a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub bikes: u32,
    pub docks: Option<u32>,
    pub is_renting: bool,
    pub is_returning: bool,
    pub last_reported: Option<DateTime<Utc>>,
}

impl From<StationStatus> for Availability {
    fn from(status: StationStatus) -> Self {
        Self {
            bikes: status.num_bikes_available,
            docks: status.num_docks_available,
            // Publishers that omit the flags are open
            is_renting: status.is_renting.is_none_or(|f| f.0),
            is_returning: status.is_returning.is_none_or(|f| f.0),
            last_reported: status.last_reported.map(|t| t.0),
        }
    }
}

/// A station with its status joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub position: Point,
    pub address: Option<String>,
    pub capacity: Option<u32>,
    /// `None` when `station_status` has no row for this station.
    pub availability: Option<Availability>,
}

/// A city's network, loaded for one request.
#[derive(Debug, Clone)]
pub struct NetworkSnapshot {
    pub discovery_url: String,
    pub name: String,
    pub operator: Option<String>,
    /// Publisher refresh interval, from `system_information`.
    pub ttl: Option<u32>,
    /// When `station_information` was last updated.
    pub last_updated: Option<DateTime<Utc>>,
    stations: Vec<Station>,
}

impl NetworkSnapshot {
    /// Fetch and join everything needed to display a network.
    ///
    /// `language` selects the feed directory and the translation of display
    /// names, falling back to the publisher's first language.
    pub async fn load<S: FeedSource>(
        source: &S,
        discovery_url: &str,
        language: Option<&str>,
    ) -> Result<Self, GbfsError> {
        let feeds = gbfs::fetch_feeds(source, discovery_url, language).await?;

        let system_url = resolve_known_feed(&feeds, FeedName::SystemInformation)?;
        let information_url = resolve_known_feed(&feeds, FeedName::StationInformation)?;
        let status_url = resolve_known_feed(&feeds, FeedName::StationStatus)?;

        let (system, information, status) = futures::try_join!(
            gbfs::fetch_system_information(source, system_url),
            gbfs::fetch_station_information(source, information_url),
            gbfs::fetch_station_status(source, status_url),
        )?;

        Self::from_documents(discovery_url, system, information, status, language)
    }

    /// Join already decoded documents.
    pub fn from_documents(
        discovery_url: &str,
        system: Envelope<SystemInformation>,
        information: Envelope<StationList<StationInformation>>,
        status: Envelope<StationList<StationStatus>>,
        language: Option<&str>,
    ) -> Result<Self, GbfsError> {
        let name = display_text(&system.data.name, language)?.to_string();
        let operator = system
            .data
            .operator
            .as_ref()
            .map(|op| display_text(op, language).map(str::to_string))
            .transpose()?;

        let stations = join_stations(information.data.stations, status.data.stations, language)?;
        debug!(%name, stations = stations.len(), "loaded network snapshot");

        Ok(Self {
            discovery_url: discovery_url.to_string(),
            name,
            operator,
            ttl: system.ttl,
            last_updated: information.last_updated.map(|t| t.0),
            stations,
        })
    }

    /// Stations in publisher order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Look up a station by ID.
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id.as_str() == id)
    }

    /// The station closest to `origin`.
    pub fn nearest(&self, origin: Point) -> Option<Nearest<'_, Station>> {
        nearest(&self.stations, origin, |s| s.position)
    }
}

/// Join information rows with status rows by station ID, keeping
/// information order.
fn join_stations(
    information: Vec<StationInformation>,
    status: Vec<StationStatus>,
    language: Option<&str>,
) -> Result<Vec<Station>, GbfsError> {
    let mut by_id: HashMap<StationId, StationStatus> = HashMap::with_capacity(status.len());
    for row in status {
        let id = row.station_id.clone();
        if by_id.insert(id.clone(), row).is_some() {
            warn!(station_id = %id, "duplicate station_status row, keeping the last");
        }
    }

    information
        .into_iter()
        .map(|info| {
            let name = display_text(&info.name, language)?.to_string();
            let availability = by_id.remove(&info.station_id).map(Availability::from);
            Ok(Station {
                id: info.station_id,
                name,
                position: Point::new(info.lat, info.lon),
                address: info.address,
                capacity: info.capacity,
                availability,
            })
        })
        .collect()
}
