//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default display language for translated feed text.
const DEFAULT_LANGUAGE: &str = "fr";

/// Error returned when an environment variable has an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {message}")]
pub struct ConfigError {
    var: &'static str,
    value: String,
    message: String,
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`VELO_BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// Optional city list replacing the built-in one (`VELO_CITIES_FILE`)
    pub cities_file: Option<PathBuf>,
    /// Static assets directory (`VELO_STATIC_DIR`)
    pub static_dir: PathBuf,
    /// Preferred language for feed text, `None` for the publisher's first
    /// (`VELO_LANGUAGE`, empty to disable)
    pub language: Option<String>,
    /// Feed response cache TTL (`VELO_CACHE_TTL_SECS`)
    pub cache_ttl: Duration,
    /// Upstream request timeout in seconds (`VELO_TIMEOUT_SECS`)
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("VELO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e: std::net::AddrParseError| ConfigError {
            var: "VELO_BIND_ADDR",
            value: bind_addr.clone(),
            message: e.to_string(),
        })?;

        let language = match lookup("VELO_LANGUAGE") {
            Some(lang) if lang.trim().is_empty() => None,
            Some(lang) => Some(lang.trim().to_string()),
            None => Some(DEFAULT_LANGUAGE.to_string()),
        };

        Ok(Self {
            bind_addr,
            cities_file: lookup("VELO_CITIES_FILE").map(PathBuf::from),
            static_dir: lookup("VELO_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            language,
            cache_ttl: Duration::from_secs(parse_secs(&lookup, "VELO_CACHE_TTL_SECS", 60)?),
            timeout_secs: parse_secs(&lookup, "VELO_TIMEOUT_SECS", 30)?,
        })
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError {
            var,
            message: e.to_string(),
            value,
        }),
    }
}
