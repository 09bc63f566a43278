//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cities::City;
use crate::network::{NetworkSnapshot, Station};

/// A configured city.
#[derive(Debug, Serialize)]
pub struct CityResult {
    /// Display name
    pub name: String,

    /// URL path segment
    pub slug: String,

    /// GBFS discovery document URL
    pub discovery_url: String,
}

impl CityResult {
    pub fn from_city(city: &City) -> Self {
        Self {
            name: city.name.clone(),
            slug: city.slug.clone(),
            discovery_url: city.discovery_url.clone(),
        }
    }
}

/// Response for the city list.
#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<CityResult>,
}

/// A station with its availability.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub address: Option<String>,

    /// Total number of docks
    pub capacity: Option<u32>,

    /// Bikes available, `None` when the publisher has no status
    pub bikes_available: Option<u32>,

    /// Free docks
    pub docks_available: Option<u32>,

    pub is_renting: Option<bool>,
    pub is_returning: Option<bool>,

    /// RFC 3339 time of the last status report
    pub last_reported: Option<String>,
}

impl StationResult {
    /// Create from a joined station.
    pub fn from_station(station: &Station) -> Self {
        let availability = station.availability.as_ref();

        Self {
            station_id: station.id.to_string(),
            name: station.name.clone(),
            lat: station.position.lat,
            lon: station.position.lon,
            address: station.address.clone(),
            capacity: station.capacity,
            bikes_available: availability.map(|a| a.bikes),
            docks_available: availability.and_then(|a| a.docks),
            is_renting: availability.map(|a| a.is_renting),
            is_returning: availability.map(|a| a.is_returning),
            last_reported: availability
                .and_then(|a| a.last_reported)
                .map(|t| t.to_rfc3339()),
        }
    }
}

/// Response for a network overview.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    /// City slug
    pub city: String,

    /// Network name from `system_information`
    pub name: String,

    pub operator: Option<String>,
    pub station_count: usize,

    /// Publisher refresh interval in seconds
    pub ttl_secs: Option<u32>,

    /// RFC 3339 time the station list was last updated
    pub last_updated: Option<String>,

    pub discovery_url: String,
    pub stations: Vec<StationResult>,
}

impl NetworkResponse {
    pub fn from_snapshot(city: &City, snapshot: &NetworkSnapshot) -> Self {
        Self {
            city: city.slug.clone(),
            name: snapshot.name.clone(),
            operator: snapshot.operator.clone(),
            station_count: snapshot.station_count(),
            ttl_secs: snapshot.ttl,
            last_updated: snapshot.last_updated.map(|t| t.to_rfc3339()),
            discovery_url: snapshot.discovery_url.clone(),
            stations: snapshot
                .stations()
                .iter()
                .map(StationResult::from_station)
                .collect(),
        }
    }
}

/// Query for the nearest station, as sent by the browser geolocation script.
#[derive(Debug, Deserialize)]
pub struct NearestRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Response for the nearest station.
#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub station: StationResult,

    /// Great-circle distance from the requested point
    pub distance_km: f64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
