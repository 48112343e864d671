//! Streaming content in and out of the store

use std::io;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio_util::io::StreamReader;

/// Push-style producer of object content
///
/// The store hands the producer a sink and the producer writes the whole
/// object into it. Implementations must be repeatable when the caller
/// retries a failed write.
#[async_trait]
pub trait ContentSource: Send {
    /// Write all content into `sink`, returning the number of bytes written
    async fn write_to(&mut self, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> io::Result<u64>;
}

#[async_trait]
impl ContentSource for Bytes {
    async fn write_to(&mut self, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> io::Result<u64> {
        sink.write_all(&self[..]).await?;
        Ok(self.len() as u64)
    }
}

#[async_trait]
impl ContentSource for Vec<u8> {
    async fn write_to(&mut self, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> io::Result<u64> {
        sink.write_all(&self[..]).await?;
        Ok(self.len() as u64)
    }
}

#[async_trait]
impl ContentSource for &'static [u8] {
    async fn write_to(&mut self, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> io::Result<u64> {
        sink.write_all(*self).await?;
        Ok(self.len() as u64)
    }
}

/// Streams any reader (a file, a pipe) into the store
///
/// Single use: a second `write_to` sees an exhausted reader.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R> ContentSource for ReaderSource<R>
where
    R: AsyncRead + Send + Unpin,
{
    async fn write_to(&mut self, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> io::Result<u64> {
        tokio::io::copy(&mut self.reader, sink).await
    }
}

/// Readable body of a stored object
///
/// Owned by the caller; dropping it releases the underlying response.
pub struct ObjectReader {
    inner: Pin<Box<dyn AsyncRead + Send>>,
    size: u64,
}

impl ObjectReader {
    pub(crate) fn from_stream(
        stream: BoxStream<'static, object_store::Result<Bytes>>,
        size: u64,
    ) -> Self {
        let reader = StreamReader::new(stream.map_err(io::Error::from));
        Self {
            inner: Box::pin(reader),
            size,
        }
    }

    /// Object size reported by the backend when the read started
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl std::fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectReader")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for ObjectReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_bytes_source_is_repeatable() {
        let mut source = Bytes::from_static(b"ledger data");

        let mut first = Vec::new();
        let written = source.write_to(&mut first).await.unwrap();
        assert_eq!(written, 11);

        let mut second = Vec::new();
        source.write_to(&mut second).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_static_slice_source() {
        let mut source: &'static [u8] = b"0-63.xdr.gz";

        let mut sink = Vec::new();
        let written = source.write_to(&mut sink).await.unwrap();
        assert_eq!(written, 11);
        assert_eq!(sink, b"0-63.xdr.gz");

        // The slice itself is not consumed
        assert_eq!(source.len(), 11);
    }

    #[tokio::test]
    async fn test_reader_source_streams_everything() {
        let data = vec![7u8; 64 * 1024];
        let mut source = ReaderSource::new(&data[..]);

        let mut sink = Vec::new();
        let written = source.write_to(&mut sink).await.unwrap();
        assert_eq!(written, data.len() as u64);
        assert_eq!(sink, data);
    }

    #[tokio::test]
    async fn test_object_reader_concatenates_chunks() {
        let chunks: Vec<object_store::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"0-63")),
            Ok(Bytes::from_static(b".xdr")),
        ];
        let stream = Box::pin(futures::stream::iter(chunks));
        let mut reader = ObjectReader::from_stream(stream, 8);

        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "0-63.xdr");
        assert_eq!(reader.size(), 8);
    }
}
