use super::models::Config;
use crate::locator::{DestinationUrl, LocatorError};
use crate::schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error("Invalid datastore destination: {0}")]
    InvalidDestination(#[from] LocatorError),

    #[error("request_timeout_secs must be positive")]
    InvalidRequestTimeout,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    config.schema.validate()?;
    validate_datastore(config)?;
    Ok(())
}

fn validate_datastore(config: &Config) -> Result<(), ValidationError> {
    if let Some(ref url) = config.datastore.destination_url {
        DestinationUrl::parse(url)?;
    }

    if config.datastore.request_timeout_secs == 0 {
        return Err(ValidationError::InvalidRequestTimeout);
    }

    Ok(())
}
