//! Resource Sources
//! Fetches raw bytes for a dataset location, over HTTP or from local disk.

use crate::config::HttpConfig;
use crate::data::loader::LoaderError;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Anything that can produce the raw bytes behind a location string.
pub trait Source: Send + Sync {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoaderError>;
}

/// Fetches `http(s)://` locations with reqwest and everything else from disk.
pub struct LocationSource {
    client: reqwest::blocking::Client,
}

impl LocationSource {
    pub fn new(http: &HttpConfig) -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .user_agent(http.user_agent.clone())
            .build()
            .map_err(|e| LoaderError::Fetch {
                location: "<client>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn is_remote(location: &str) -> bool {
        location.starts_with("http://") || location.starts_with("https://")
    }

    fn fetch_remote(&self, location: &str) -> Result<Vec<u8>, LoaderError> {
        let fetch_err = |reason: String| LoaderError::Fetch {
            location: location.to_string(),
            reason,
        };

        let response = self
            .client
            .get(location)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_err(e.to_string()))?;

        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn fetch_local(location: &str) -> Result<Vec<u8>, LoaderError> {
        std::fs::read(Path::new(location)).map_err(|e| LoaderError::Fetch {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Source for LocationSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoaderError> {
        debug!(%location, "Fetching resource");
        if Self::is_remote(location) {
            self.fetch_remote(location)
        } else {
            Self::fetch_local(location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_scheme_detection() {
        assert!(LocationSource::is_remote("https://example.org/a.csv"));
        assert!(LocationSource::is_remote("http://localhost/a.csv"));
        assert!(!LocationSource::is_remote("data/a.csv"));
        assert!(!LocationSource::is_remote("/tmp/https.csv"));
    }

    #[test]
    fn missing_local_file_is_fetch_error() {
        let err = LocationSource::fetch_local("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoaderError::Fetch { .. }));
    }
}
