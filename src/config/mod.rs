//! Configuration management for ledgerstore
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use ledgerstore::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Ledgers per file: {}", config.schema.ledgers_per_file);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `LEDGERSTORE__<section>__<key>`
//!
//! Examples:
//! - `LEDGERSTORE__DATASTORE__DESTINATION_URL=gcs://ledger-archive/pubnet`
//! - `LEDGERSTORE__SCHEMA__LEDGERS_PER_FILE=1`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/ledgerstore.toml`.
//! This can be overridden using the `LEDGERSTORE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::schema::DataStoreSchema;
pub use models::{Config, DataStoreConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`LEDGERSTORE__*`)
    /// 2. TOML file (default: `config/ledgerstore.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (zero ledgers per file, unsupported destination, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
