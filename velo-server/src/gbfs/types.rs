//! Serde models for GBFS documents.
//!
//! Only the fields the server displays are modelled. The types accept the
//! shapes seen across GBFS v1, v2 and v3 feeds in the wild: POSIX or RFC 3339
//! timestamps, numeric or string station IDs, and `0`/`1` or boolean flags.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// The envelope shared by every GBFS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// When the publisher last updated the document.
    #[serde(default)]
    pub last_updated: Option<Timestamp>,

    /// Seconds before the document should be fetched again.
    #[serde(default)]
    pub ttl: Option<u32>,

    pub data: T,
}

/// A point in time, decoded from either POSIX seconds (v1/v2) or an
/// RFC 3339 string (v3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Posix(i64),
            PosixFloat(f64),
            Rfc3339(String),
        }

        let from_secs = |secs: i64| {
            DateTime::from_timestamp(secs, 0)
                .map(Timestamp)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {secs}")))
        };

        match Raw::deserialize(deserializer)? {
            Raw::Posix(secs) => from_secs(secs),
            Raw::PosixFloat(secs) => from_secs(secs as i64),
            Raw::Rfc3339(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Timestamp(dt.with_timezone(&Utc)))
                .map_err(|e| de::Error::custom(format!("invalid timestamp '{s}': {e}"))),
        }
    }
}

/// One entry of a feed directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Feed {
    pub name: String,
    pub url: String,
}

/// The `data` object of a discovery document.
///
/// v3 (and some v2 publishers) list feeds directly; v1/v2 nest them under
/// one key per language.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DiscoveryData {
    Flat { feeds: Vec<Feed> },
    ByLanguage(LanguageFeeds),
}

/// Feed directories keyed by language, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageFeeds(pub Vec<(String, Vec<Feed>)>);

impl<'de> Deserialize<'de> for LanguageFeeds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct FeedList {
            feeds: Vec<Feed>,
        }

        struct LanguageFeedsVisitor;

        impl<'de> Visitor<'de> for LanguageFeedsVisitor {
            type Value = LanguageFeeds;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of language codes to feed lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut languages = Vec::new();
                while let Some((language, list)) = map.next_entry::<String, FeedList>()? {
                    languages.push((language, list.feeds));
                }
                Ok(LanguageFeeds(languages))
            }
        }

        deserializer.deserialize_map(LanguageFeedsVisitor)
    }
}

/// Display text that may or may not be translated.
///
/// GBFS v3 publishes `[{ "language": .., "text": .. }]` lists; older
/// versions publish a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Translated(Vec<Translation>),
}

/// One translation of a [`LocalizedText`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Translation {
    pub language: String,
    pub text: String,
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText::Plain(text.to_string())
    }
}

/// A station identifier.
///
/// The GBFS schema says IDs are strings, but several publishers emit
/// integers. Both are normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => StationId(s),
            Raw::Number(n) => StationId(n.to_string()),
        })
    }
}

/// A boolean that GBFS v1 encodes as `0`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Flag(b),
            Raw::Int(n) => Flag(n != 0),
        })
    }
}

/// `system_information` data.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemInformation {
    pub system_id: Option<String>,
    pub name: LocalizedText,
    pub operator: Option<LocalizedText>,
    /// v1/v2 single language.
    pub language: Option<String>,
    /// v3 language list.
    #[serde(default)]
    pub languages: Vec<String>,
    pub timezone: Option<String>,
    pub url: Option<String>,
}

/// The `{ "stations": [...] }` data object shared by the station feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct StationList<T> {
    pub stations: Vec<T>,
}

/// One row of `station_information`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationInformation {
    pub station_id: StationId,
    pub name: LocalizedText,
    pub lat: f64,
    pub lon: f64,
    pub address: Option<String>,
    pub capacity: Option<u32>,
}

/// One row of `station_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationStatus {
    pub station_id: StationId,
    #[serde(alias = "num_vehicles_available")]
    pub num_bikes_available: u32,
    pub num_docks_available: Option<u32>,
    pub is_renting: Option<Flag>,
    pub is_returning: Option<Flag>,
    pub last_reported: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_discovery() {
        let json = r#"{
            "last_updated": 1700000000,
            "ttl": 60,
            "data": { "feeds": [
                { "name": "system_information", "url": "https://example.org/si.json" }
            ] }
        }"#;
        let doc: Envelope<DiscoveryData> = serde_json::from_str(json).unwrap();
        assert_eq!(doc.ttl, Some(60));
        match doc.data {
            DiscoveryData::Flat { feeds } => {
                assert_eq!(feeds.len(), 1);
                assert_eq!(feeds[0].name, "system_information");
            }
            other => panic!("expected flat directory, got {other:?}"),
        }
    }

    #[test]
    fn nested_discovery_keeps_language_order() {
        let json = r#"{
            "last_updated": 1700000000,
            "ttl": 0,
            "data": {
                "fr": { "feeds": [ { "name": "station_status", "url": "https://example.org/fr/ss.json" } ] },
                "en": { "feeds": [ { "name": "station_status", "url": "https://example.org/en/ss.json" } ] }
            }
        }"#;
        let doc: Envelope<DiscoveryData> = serde_json::from_str(json).unwrap();
        match doc.data {
            DiscoveryData::ByLanguage(LanguageFeeds(languages)) => {
                let keys: Vec<&str> = languages.iter().map(|(l, _)| l.as_str()).collect();
                assert_eq!(keys, ["fr", "en"]);
            }
            other => panic!("expected nested directory, got {other:?}"),
        }
    }

    #[test]
    fn timestamps_from_posix_and_rfc3339() {
        let posix: Timestamp = serde_json::from_str("1700000000").unwrap();
        let rfc: Timestamp = serde_json::from_str(r#""2023-11-14T22:13:20Z""#).unwrap();
        assert_eq!(posix, rfc);

        let offset: Timestamp = serde_json::from_str(r#""2023-11-14T23:13:20+01:00""#).unwrap();
        assert_eq!(offset, posix);
    }

    #[test]
    fn invalid_timestamp_rejected() {
        assert!(serde_json::from_str::<Timestamp>(r#""yesterday""#).is_err());
    }

    #[test]
    fn localized_text_shapes() {
        let plain: LocalizedText = serde_json::from_str(r#""Vélo Star""#).unwrap();
        assert_eq!(plain, LocalizedText::Plain("Vélo Star".into()));

        let translated: LocalizedText =
            serde_json::from_str(r#"[{ "language": "fr", "text": "Gare" }]"#).unwrap();
        assert_eq!(
            translated,
            LocalizedText::Translated(vec![Translation {
                language: "fr".into(),
                text: "Gare".into(),
            }])
        );
    }

    #[test]
    fn numeric_station_id() {
        let id: StationId = serde_json::from_str("16107").unwrap();
        assert_eq!(id.as_str(), "16107");

        let id: StationId = serde_json::from_str(r#""abc-1""#).unwrap();
        assert_eq!(id.as_str(), "abc-1");
    }

    #[test]
    fn v1_station_status() {
        let json = r#"{
            "station_id": 12,
            "num_bikes_available": 4,
            "num_docks_available": 8,
            "is_renting": 1,
            "is_returning": 0,
            "last_reported": 1700000000
        }"#;
        let status: StationStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.station_id.as_str(), "12");
        assert_eq!(status.num_bikes_available, 4);
        assert_eq!(status.is_renting, Some(Flag(true)));
        assert_eq!(status.is_returning, Some(Flag(false)));
    }

    #[test]
    fn v3_station_status_uses_vehicle_count() {
        let json = r#"{
            "station_id": "A",
            "num_vehicles_available": 7,
            "is_renting": true,
            "is_returning": true,
            "last_reported": "2023-11-14T22:13:20Z"
        }"#;
        let status: StationStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.num_bikes_available, 7);
        assert_eq!(status.num_docks_available, None);
    }

    #[test]
    fn v3_station_information() {
        let json = r#"{
            "station_id": "st-1",
            "name": [{ "language": "fr", "text": "Place de la Mairie" }],
            "lat": 48.1119,
            "lon": -1.6799,
            "capacity": 20
        }"#;
        let info: StationInformation = serde_json::from_str(json).unwrap();
        assert_eq!(info.capacity, Some(20));
        assert_eq!(info.address, None);
        assert!(matches!(info.name, LocalizedText::Translated(_)));
    }
}
