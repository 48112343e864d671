pub mod config;
pub mod context;
pub mod locator;
pub mod observability;
pub mod schema;
pub mod storage;

pub use context::Context;
pub use schema::{DataStoreSchema, derive_key};
pub use storage::{DataStore, DataStoreError, GcsDataStore};
