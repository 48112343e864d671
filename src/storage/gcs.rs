use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use object_store::buffered::BufWriter;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::{ObjectStore, path::Path as StoragePath};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::error::{DataStoreError, Result};
use super::source::{ContentSource, ObjectReader};
use super::traits::DataStore;
use crate::context::Context;
use crate::locator::DestinationUrl;
use crate::observability::{MetricsSnapshot, StoreMetrics};

/// Data store bound to one bucket and key prefix
///
/// Built on the `object_store` crate. [`GcsDataStore::open`] talks to Google
/// Cloud Storage; [`GcsDataStore::with_backend`] binds any other
/// `ObjectStore` (in-memory, local disk) behind the same contract.
#[derive(Debug)]
pub struct GcsDataStore {
    backend: RwLock<Option<Arc<dyn ObjectStore>>>,
    bucket: String,
    prefix: String,
    metrics: StoreMetrics,
}

impl GcsDataStore {
    /// Connect to the bucket named by a `gcs://bucket/prefix` URL
    ///
    /// Credentials come from the environment (`GOOGLE_SERVICE_ACCOUNT`,
    /// `GOOGLE_APPLICATION_CREDENTIALS`, ...). The bucket is probed before
    /// returning, so a missing or inaccessible bucket fails here.
    pub async fn open(ctx: &Context, destination_url: &str) -> Result<Self> {
        let construction = |reason: String| DataStoreError::Construction {
            url: destination_url.to_string(),
            reason,
        };

        let destination =
            DestinationUrl::parse(destination_url).map_err(|e| construction(e.to_string()))?;

        info!(
            bucket = %destination.bucket,
            prefix = %destination.prefix,
            "Creating GCS client"
        );

        let client = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&destination.bucket)
            .build()
            .map_err(|e| construction(e.to_string()))?;

        Self::with_backend(ctx, Arc::new(client), destination.bucket, destination.prefix).await
    }

    /// Bind an already configured backend, probing it like [`GcsDataStore::open`]
    pub async fn with_backend(
        ctx: &Context,
        backend: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let bucket = bucket.into();
        let prefix = prefix.into().trim_start_matches('/').to_string();
        let url = format!("gcs://{}/{}", bucket, prefix);

        let probe_path = (!prefix.is_empty()).then(|| StoragePath::from(prefix.as_str()));
        match ctx.run(backend.list_with_delimiter(probe_path.as_ref())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(DataStoreError::Construction {
                    url,
                    reason: format!("failed to retrieve bucket attributes: {}", e),
                });
            }
            Err(e) => {
                return Err(DataStoreError::Construction {
                    url,
                    reason: e.to_string(),
                });
            }
        }

        debug!(bucket = %bucket, prefix = %prefix, "Bucket probe succeeded");

        Ok(Self {
            backend: RwLock::new(Some(backend)),
            bucket,
            prefix,
            metrics: StoreMetrics::new(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn backend(&self, op: &'static str) -> Result<Arc<dyn ObjectStore>> {
        self.backend
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DataStoreError::Closed { op })
    }

    /// Resolve a key relative to the bound prefix
    fn object_path(&self, key: &str) -> StoragePath {
        if self.prefix.is_empty() {
            StoragePath::from(key)
        } else {
            StoragePath::from(format!("{}/{}", self.prefix, key))
        }
    }
}

/// Run one backend call under `ctx`, tagging expiry with the operation
async fn within<F>(ctx: &Context, op: &'static str, key: &str, fut: F) -> Result<F::Output>
where
    F: Future,
{
    ctx.run(fut)
        .await
        .map_err(|err| DataStoreError::from_context(op, key, err))
}

#[async_trait]
impl DataStore for GcsDataStore {
    async fn get(&self, ctx: &Context, key: &str) -> Result<ObjectReader> {
        let backend = self.backend("get")?;
        let path = self.object_path(key);

        let result = match within(ctx, "get", key, backend.get(&path)).await? {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                self.metrics.not_found();
                return Err(DataStoreError::NotFound {
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(DataStoreError::io("get", key, e)),
        };

        let size = result.meta.size;
        self.metrics.object_read();
        debug!(key, size, "Opened object for reading");

        Ok(ObjectReader::from_stream(result.into_stream(), size))
    }

    async fn put(&self, ctx: &Context, key: &str, source: &mut dyn ContentSource) -> Result<()> {
        let backend = self.backend("put")?;
        let path = self.object_path(key);

        let mut writer = BufWriter::new(backend, path);
        let outcome = within(ctx, "put", key, async {
            let size = source
                .write_to(&mut writer)
                .await
                .map_err(|e| DataStoreError::transfer("put", key, e))?;
            writer
                .shutdown()
                .await
                .map_err(|e| DataStoreError::transfer("put", key, e))?;
            Ok::<_, DataStoreError>(size)
        })
        .await
        .and_then(|written| written);

        match outcome {
            Ok(size) => {
                self.metrics.object_written();
                info!(key, size, bucket = %self.bucket, "Uploaded to storage");
                Ok(())
            }
            Err(err) => {
                // Nothing partial may become visible under the key
                if let Err(abort_err) = writer.abort().await {
                    warn!(key, error = %abort_err, "Failed to abort upload");
                }
                Err(err)
            }
        }
    }

    async fn put_if_not_exists(
        &self,
        ctx: &Context,
        key: &str,
        source: &mut dyn ContentSource,
    ) -> Result<bool> {
        if self.exists(ctx, key).await? {
            self.metrics.write_skipped();
            info!(key, "Object already exists, skipping write");
            return Ok(false);
        }

        self.put(ctx, key, source).await?;
        Ok(true)
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<bool> {
        let backend = self.backend("exists")?;
        let path = self.object_path(key);

        match within(ctx, "exists", key, backend.head(&path)).await? {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(DataStoreError::io("exists", key, e)),
        }
    }

    async fn size(&self, ctx: &Context, key: &str) -> Result<u64> {
        let backend = self.backend("size")?;
        let path = self.object_path(key);

        match within(ctx, "size", key, backend.head(&path)).await? {
            Ok(meta) => Ok(meta.size),
            Err(object_store::Error::NotFound { .. }) => {
                self.metrics.not_found();
                Err(DataStoreError::NotFound {
                    key: key.to_string(),
                })
            }
            Err(e) => Err(DataStoreError::io("size", key, e)),
        }
    }

    async fn close(&self) -> Result<()> {
        let released = self
            .backend
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match released {
            Some(_) => {
                info!(bucket = %self.bucket, prefix = %self.prefix, "Closed data store");
                Ok(())
            }
            None => Err(DataStoreError::Closed { op: "close" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use object_store::memory::InMemory;
    use tokio::io::AsyncReadExt;

    async fn create_test_store(prefix: &str) -> (GcsDataStore, Arc<InMemory>) {
        let memory = Arc::new(InMemory::new());
        let store = GcsDataStore::with_backend(
            &Context::background(),
            memory.clone(),
            "ledger-test",
            prefix,
        )
        .await
        .unwrap();
        (store, memory)
    }

    #[tokio::test]
    async fn test_keys_resolve_under_prefix() {
        let (store, memory) = create_test_store("/archive/v1").await;
        assert_eq!(store.prefix(), "archive/v1");

        let ctx = Context::background();
        store
            .put(&ctx, "0-639/0-63.xdr.gz", &mut Bytes::from_static(b"abc"))
            .await
            .unwrap();

        let raw = memory
            .head(&StoragePath::from("archive/v1/0-639/0-63.xdr.gz"))
            .await
            .unwrap();
        assert_eq!(raw.size, 3);
    }

    #[tokio::test]
    async fn test_empty_prefix() {
        let (store, memory) = create_test_store("").await;
        let ctx = Context::background();
        store
            .put(&ctx, "5.xdr.gz", &mut b"x".to_vec())
            .await
            .unwrap();

        assert!(memory.head(&StoragePath::from("5.xdr.gz")).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_reads_back_bytes() {
        let (store, _memory) = create_test_store("p").await;
        let ctx = Context::background();
        store
            .put(&ctx, "0-63.xdr.gz", &mut Bytes::from_static(b"ledgers"))
            .await
            .unwrap();

        let mut reader = store.get(&ctx, "0-63.xdr.gz").await.unwrap();
        assert_eq!(reader.size(), 7);
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();
        assert_eq!(data, b"ledgers");
    }

    #[tokio::test]
    async fn test_missing_object() {
        let (store, _memory) = create_test_store("p").await;
        let ctx = Context::background();

        let err = store.get(&ctx, "missing").await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.size(&ctx, "missing").await.unwrap_err();
        assert!(err.is_not_found());

        assert!(!store.exists(&ctx, "missing").await.unwrap());
        assert_eq!(store.metrics().not_found, 2);
    }

    #[tokio::test]
    async fn test_put_if_not_exists_keeps_first_write() {
        let (store, _memory) = create_test_store("p").await;
        let ctx = Context::background();

        let written = store
            .put_if_not_exists(&ctx, "64-127", &mut Bytes::from_static(b"first"))
            .await
            .unwrap();
        assert!(written);

        let written = store
            .put_if_not_exists(&ctx, "64-127", &mut Bytes::from_static(b"second!"))
            .await
            .unwrap();
        assert!(!written);
        assert_eq!(store.size(&ctx, "64-127").await.unwrap(), 5);

        let metrics = store.metrics();
        assert_eq!(metrics.objects_written, 1);
        assert_eq!(metrics.writes_skipped, 1);
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let (store, _memory) = create_test_store("p").await;
        let ctx = Context::background();
        ctx.cancel();

        let err = store.exists(&ctx, "0-63").await.unwrap_err();
        assert!(matches!(err, DataStoreError::Cancelled { op: "exists", .. }));

        let err = store
            .put(&ctx, "0-63", &mut Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataStoreError::Cancelled { op: "put", .. }));
        assert!(!store.exists(&Context::background(), "0-63").await.unwrap());
    }

    #[tokio::test]
    async fn test_close_then_use_fails() {
        let (store, _memory) = create_test_store("p").await;
        store.close().await.unwrap();

        let ctx = Context::background();
        let err = store.exists(&ctx, "0-63").await.unwrap_err();
        assert!(matches!(err, DataStoreError::Closed { op: "exists" }));

        let err = store.close().await.unwrap_err();
        assert!(matches!(err, DataStoreError::Closed { op: "close" }));
    }

    #[tokio::test]
    async fn test_open_rejects_other_schemes() {
        let err = GcsDataStore::open(&Context::background(), "s3://bucket/prefix")
            .await
            .unwrap_err();
        assert!(matches!(err, DataStoreError::Construction { .. }));
    }
}
