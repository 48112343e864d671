//! Destination locator parsing (`gcs://bucket/path/prefix`)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// The only scheme a destination may use
pub const GCS_SCHEME: &str = "gcs";

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Invalid destination URL {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid destination URL {url}. Expected GCS URL (scheme '{scheme}' is not supported)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Invalid destination URL {0}: missing bucket name")]
    MissingBucket(String),
}

/// Parsed destination: one bucket plus a key prefix under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationUrl {
    pub bucket: String,
    /// Never starts with `/`
    pub prefix: String,
}

impl DestinationUrl {
    pub fn parse(destination_url: &str) -> Result<Self, LocatorError> {
        let parsed = Url::parse(destination_url).map_err(|source| LocatorError::Malformed {
            url: destination_url.to_string(),
            source,
        })?;

        if parsed.scheme() != GCS_SCHEME {
            return Err(LocatorError::UnsupportedScheme {
                url: destination_url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        let bucket = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(LocatorError::MissingBucket(destination_url.to_string())),
        };

        // Object keys are never rooted with a separator
        let prefix = parsed.path().trim_start_matches('/').to_string();

        Ok(Self { bucket, prefix })
    }
}

impl FromStr for DestinationUrl {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DestinationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", GCS_SCHEME, self.bucket, self.prefix)
    }
}
