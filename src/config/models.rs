use crate::schema::DataStoreSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub datastore: DataStoreConfig,
    #[serde(default)]
    pub schema: DataStoreSchema,
}

/// Where archived files are stored
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataStoreConfig {
    /// `gcs://bucket/prefix`; storage commands refuse to run without it
    pub destination_url: Option<String>,
    /// Upper bound for a single storage call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            destination_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DataStoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_request_timeout_secs() -> u64 {
    60
}
