use async_trait::async_trait;

use super::error::Result;
use super::source::{ContentSource, ObjectReader};
use crate::context::Context;

/// Storage backend holding archived ledger files
///
/// Keys are relative to the prefix the store was opened with. Every I/O
/// call runs under `ctx` and fails with `Cancelled`/`DeadlineExceeded` when
/// the context ends first. Nothing retries at this layer.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Open a stream over the object at `key`
    ///
    /// Fails with `NotFound` when no object exists.
    async fn get(&self, ctx: &Context, key: &str) -> Result<ObjectReader>;

    /// Write (or overwrite) `key` with everything `source` produces
    async fn put(&self, ctx: &Context, key: &str, source: &mut dyn ContentSource) -> Result<()>;

    /// Write `key` only when nothing is stored there yet
    ///
    /// Returns `false` without touching the stored object when it already
    /// exists. The check and the write are not atomic across writers.
    async fn put_if_not_exists(
        &self,
        ctx: &Context,
        key: &str,
        source: &mut dyn ContentSource,
    ) -> Result<bool>;

    async fn exists(&self, ctx: &Context, key: &str) -> Result<bool>;

    /// Stored size in bytes
    async fn size(&self, ctx: &Context, key: &str) -> Result<u64>;

    /// Release the backend client. Later calls fail with `Closed`.
    async fn close(&self) -> Result<()>;

    // TODO: directory/file listing for binary search over archived ranges
}
