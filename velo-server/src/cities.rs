//! The configured bike-share networks.
//!
//! A fixed, ordered table of city name to GBFS discovery URL. It is loaded
//! once at startup, either from the built-in list or from a JSON file, and
//! shared read-only afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Built-in networks, in display order.
const DEFAULT_CITIES: &[(&str, &str)] = &[
    ("Rennes", "https://eu.ftp.opendatasoft.com/star/gbfs/gbfs.json"),
    (
        "Paris et communes limitrophes",
        "https://velib-metropole-opendata.smovengo.cloud/opendata/Velib_Metropole/gbfs.json",
    ),
    (
        "Lyon",
        "https://download.data.grandlyon.com/files/rdata/jcd_jcdecaux.jcdvelov/gbfs.json",
    ),
    (
        "Marseille",
        "https://api.omega.fifteen.eu/gbfs/2.2/marseille/en/gbfs.json?&key=MjE0ZDNmMGEtNGFkZS00M2FlLWFmMWItZGNhOTZhMWQyYzM2",
    ),
    ("Agen", "https://api.gbfs.ecovelo.mobi/tempovelo/gbfs.json"),
    (
        "Bordeaux",
        "https://bdx.mecatran.com/utw/ws/gbfs/bordeaux/v3/gbfs.json?apiKey=opendata-bordeaux-metropole-flux-gtfs-rt",
    ),
    ("Brest", "https://gbfs.partners.fifteen.eu/gbfs/2.2/brest/en/gbfs.json"),
    ("Carcassonne", "https://api.gbfs.ecovelo.mobi/cyclolibre/gbfs.json"),
    ("Lille", "https://media.ilevia.fr/opendata/gbfs.json"),
    ("Montpellier", "https://montpellier-fr.fifteen.site/gbfs/gbfs.json"),
    ("Mulhouse", "https://api.cyclocity.fr/contracts/mulhouse/gbfs/gbfs.json"),
    ("Nancy", "https://api.cyclocity.fr/contracts/nancy/gbfs/gbfs.json"),
    ("Nantes", "https://api.cyclocity.fr/contracts/nantes/gbfs/gbfs.json"),
    ("Niort", "https://api.gbfs.ecovelo.mobi/tanlib/gbfs.json"),
    (
        "Saint-Brieuc",
        "https://gateway.prod.partners-fs37hd8.zoov.site/gbfs/2.2/saintbrieuc/en/gbfs.json?key=YmE1ZDVlNDYtMGIwNy00MGEyLWIxZWYtNGEwOGQ4NTYxNTYz",
    ),
    ("Strasbourg", "https://gbfs.nextbike.net/maps/gbfs/v2/nextbike_ae/gbfs.json"),
    ("Tarbes", "https://api.gbfs.ecovelo.mobi/tlpmobilites/gbfs.json"),
    ("Epinal", "https://gbfs.partners.fifteen.eu/gbfs/epinal/gbfs.json"),
    (
        "La Bresse Gérardmer",
        "https://api.gbfs.v3.0.ecovelo.mobi/labresse/gbfs.json",
    ),
    (
        "Valenciennes",
        "https://stables.donkey.bike/api/public/gbfs/2/donkey_valenciennes/gbfs",
    ),
    ("Vichy", "https://gbfs.partners.fifteen.eu/gbfs/vichy/gbfs.json"),
];

/// Errors loading a city table.
#[derive(Debug, thiserror::Error)]
pub enum CityConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid city list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("city list is empty")]
    Empty,

    #[error("duplicate city: {0}")]
    Duplicate(String),

    #[error("city name {0:?} has no letters or digits to build a URL from")]
    EmptySlug(String),

    #[error("invalid discovery URL for {name}: {message}")]
    InvalidUrl { name: String, message: String },
}

/// A bike-share network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    /// Display name.
    pub name: String,
    /// URL path segment derived from the name.
    pub slug: String,
    /// GBFS discovery document URL.
    pub discovery_url: String,
}

impl City {
    fn new(name: &str, discovery_url: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slugify(name),
            discovery_url: discovery_url.to_string(),
        }
    }
}

/// One entry of a city list file.
#[derive(Debug, Deserialize)]
struct CityEntry {
    name: String,
    url: String,
}

/// Immutable, ordered table of networks.
#[derive(Debug, Clone)]
pub struct CityRegistry {
    cities: Vec<City>,
}

impl CityRegistry {
    /// Build a registry from `(name, discovery_url)` pairs.
    ///
    /// Rejects empty lists, names that collide (after slugging), and URLs
    /// that do not parse as http(s).
    pub fn new<N, U>(entries: impl IntoIterator<Item = (N, U)>) -> Result<Self, CityConfigError>
    where
        N: AsRef<str>,
        U: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut cities = Vec::new();

        for (name, url) in entries {
            let city = City::new(name.as_ref().trim(), url.as_ref().trim());

            match reqwest::Url::parse(&city.discovery_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => {
                    return Err(CityConfigError::InvalidUrl {
                        name: city.name,
                        message: format!("unsupported scheme '{}'", parsed.scheme()),
                    });
                }
                Err(e) => {
                    return Err(CityConfigError::InvalidUrl {
                        name: city.name,
                        message: e.to_string(),
                    });
                }
            }

            if city.slug.is_empty() {
                return Err(CityConfigError::EmptySlug(city.name));
            }
            if !seen.insert(city.slug.clone()) {
                return Err(CityConfigError::Duplicate(city.name));
            }
            cities.push(city);
        }

        if cities.is_empty() {
            return Err(CityConfigError::Empty);
        }

        Ok(Self { cities })
    }

    /// Parse a JSON array of `{ "name": .., "url": .. }` objects.
    pub fn from_json_str(json: &str) -> Result<Self, CityConfigError> {
        let entries: Vec<CityEntry> = serde_json::from_str(json)?;
        Self::new(entries.into_iter().map(|e| (e.name, e.url)))
    }

    /// Load a city list file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CityConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CityConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Look up a city by slug.
    pub fn get(&self, slug: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.slug == slug)
    }

    /// Look up a city by display name.
    pub fn by_name(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Cities in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self {
            cities: DEFAULT_CITIES
                .iter()
                .map(|(name, url)| City::new(name, url))
                .collect(),
        }
    }
}

/// Lowercase ASCII slug: accents folded, runs of anything else collapsed
/// to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let folded = match c {
            'à' | 'â' | 'ä' | 'á' => 'a',
            'ç' => 'c',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ÿ' => 'y',
            'œ' => {
                push_slug_part(&mut slug, &mut pending_dash, "oe");
                continue;
            }
            'æ' => {
                push_slug_part(&mut slug, &mut pending_dash, "ae");
                continue;
            }
            other => other,
        };

        if folded.is_ascii_alphanumeric() {
            let mut buf = [0u8; 4];
            push_slug_part(&mut slug, &mut pending_dash, folded.encode_utf8(&mut buf));
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn push_slug_part(slug: &mut String, pending_dash: &mut bool, part: &str) {
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
    slug.push_str(part);
}
