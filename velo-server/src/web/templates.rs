//! Askama templates for the web frontend.

use askama::Template;

use crate::cities::City;
use crate::network::{NetworkSnapshot, Station};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the city list.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub cities: Vec<CityView>,
}

/// Network overview with the station list.
#[derive(Template)]
#[template(path = "network.html")]
pub struct NetworkTemplate {
    pub city: CityView,
    pub network: NetworkView,
}

/// Station detail, also used for the nearest-station result.
#[derive(Template)]
#[template(path = "station.html")]
pub struct StationTemplate {
    pub city: CityView,
    pub network_name: String,
    pub station: StationView,
    /// Formatted distance from the user, for nearest-station results.
    pub distance: Option<String>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// City view model.
#[derive(Debug, Clone)]
pub struct CityView {
    pub name: String,
    pub slug: String,
}

impl CityView {
    pub fn from_city(city: &City) -> Self {
        Self {
            name: city.name.clone(),
            slug: city.slug.clone(),
        }
    }
}

/// Network view model.
#[derive(Debug, Clone)]
pub struct NetworkView {
    pub name: String,
    pub operator: Option<String>,
    pub station_count: usize,
    pub ttl_secs: Option<u32>,
    pub last_updated: Option<String>,
    pub discovery_url: String,
    pub stations: Vec<StationView>,
}

impl NetworkView {
    /// Create from a network snapshot.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            operator: snapshot.operator.clone(),
            station_count: snapshot.station_count(),
            ttl_secs: snapshot.ttl,
            last_updated: snapshot
                .last_updated
                .map(|t| t.format("%d/%m/%Y %H:%M:%S UTC").to_string()),
            discovery_url: snapshot.discovery_url.clone(),
            stations: snapshot
                .stations()
                .iter()
                .map(StationView::from_station)
                .collect(),
        }
    }

    /// Sentence describing where the data comes from and how fresh it is.
    pub fn freshness_summary(&self) -> String {
        let provider = self
            .operator
            .as_ref()
            .map(|op| format!(" sont fournies par {op} et"))
            .unwrap_or_default();

        match self.ttl_secs {
            Some(ttl) => format!("Les données{provider} sont mises à jour toutes les {ttl} secondes."),
            None => format!("Les données{provider} sont mises à jour en continu."),
        }
    }
}

/// Station view model.
#[derive(Debug, Clone)]
pub struct StationView {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub capacity: Option<u32>,
    pub bikes: Option<u32>,
    pub docks: Option<u32>,
    pub is_renting: bool,
}

impl StationView {
    /// Create from a joined station.
    pub fn from_station(station: &Station) -> Self {
        let availability = station.availability.as_ref();

        Self {
            id: station.id.to_string(),
            name: station.name.trim().to_string(),
            address: station.address.clone(),
            lat: station.position.lat,
            lon: station.position.lon,
            capacity: station.capacity,
            bikes: availability.map(|a| a.bikes),
            docks: availability.and_then(|a| a.docks),
            is_renting: availability.is_some_and(|a| a.is_renting),
        }
    }

    pub fn coordinates(&self) -> String {
        format!("{}, {}", self.lat, self.lon)
    }

    pub fn capacity_display(&self) -> String {
        count_display(self.capacity)
    }

    pub fn bikes_display(&self) -> String {
        count_display(self.bikes)
    }

    pub fn docks_display(&self) -> String {
        count_display(self.docks)
    }

    /// Whether there is a bike to take right now.
    pub fn has_bikes(&self) -> bool {
        self.is_renting && self.bikes.is_some_and(|n| n > 0)
    }
}

fn count_display(count: Option<u32>) -> String {
    count.map(|n| n.to_string()).unwrap_or_else(|| "–".to_string())
}

/// Format a distance the way the French UI shows it: metres below one
/// kilometre, otherwise kilometres with a decimal comma.
pub fn format_distance(km: f64) -> String {
    let metres = (km * 1000.0).round();
    if metres < 1000.0 {
        format!("{} m", metres as u32)
    } else {
        format!("{:.1} km", km).replace('.', ",")
    }
}
