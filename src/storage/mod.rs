//! Object storage for archived ledger files
//! Uses Apache Arrow object_store crate
//!
//! ## Key Components
//!
//! - [`DataStore`] - get/put/exists/size/close contract every backend satisfies
//! - [`GcsDataStore`] - the concrete store, bound to one bucket and prefix
//! - [`ContentSource`] - push-style producer streamed into `put`
//! - [`ObjectReader`] - caller-owned stream returned by `get`
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledgerstore::context::Context;
//! use ledgerstore::storage::{DataStore, new_data_store};
//!
//! let ctx = Context::background();
//! let store = new_data_store(&ctx, "gcs://ledger-archive/pubnet").await?;
//! let key = schema.object_key(seq)?;
//! let written = store.put_if_not_exists(&ctx, &key, &mut payload).await?;
//! store.close().await?;
//! ```

mod error;
mod gcs;
mod source;
mod traits;

use std::sync::Arc;

pub use error::{DataStoreError, Result};
pub use gcs::GcsDataStore;
pub use source::{ContentSource, ObjectReader, ReaderSource};
pub use traits::DataStore;

use crate::context::Context;

/// Open the data store a destination URL points at
///
/// Only `gcs://` destinations are supported.
pub async fn new_data_store(ctx: &Context, destination_url: &str) -> Result<Arc<dyn DataStore>> {
    let store = GcsDataStore::open(ctx, destination_url).await?;
    Ok(Arc::new(store))
}
