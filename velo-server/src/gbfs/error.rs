//! GBFS client error types.

use std::sync::Arc;

use super::resolve::ResolveError;

/// Errors that can occur while fetching and reading GBFS feeds.
#[derive(Debug, thiserror::Error)]
pub enum GbfsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Publisher returned an error status
    #[error("feed error {status} from {url}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// Response body was not the expected JSON
    #[error("JSON parse error in {url}: {message}")]
    Json { url: String, message: String },

    /// Document parsed but lacks a feed or translation we need
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A failure reported to several requests waiting on the same fetch
    #[error(transparent)]
    Shared(Arc<GbfsError>),
}

impl GbfsError {
    /// Whether the failure is a lookup miss rather than a transport or
    /// decoding problem.
    pub fn is_not_found(&self) -> bool {
        match self {
            GbfsError::Resolve(_) => true,
            GbfsError::Shared(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GbfsError::Api {
            url: "https://example.org/gbfs.json".into(),
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "feed error 503 from https://example.org/gbfs.json: Service Unavailable"
        );

        let err = GbfsError::Json {
            url: "https://example.org/gbfs.json".into(),
            message: "expected value".into(),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected value"));

        let err = GbfsError::from(ResolveError::FeedNotFound("station_status".into()));
        assert_eq!(err.to_string(), "no 'station_status' feed found");
        assert!(err.is_not_found());

        let shared = GbfsError::Shared(Arc::new(err));
        assert_eq!(shared.to_string(), "no 'station_status' feed found");
        assert!(shared.is_not_found());
    }
}
