//! Value reading and writing over tokio byte streams.

use std::future::Future;
use std::pin::Pin;

use bytes::BytesMut;
use indexmap::IndexMap;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::decode::{scalar_from_le_bytes, string_from_utf8, MAX_PREALLOC};
use crate::codec::varint::VarintDecoder;
use crate::codec::{encode, Limits, Tag};
use crate::error::{AetherError, Result};
use crate::types::{Dict, FromValue, Value};

type BoxedRead<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Reads Aether values from an `AsyncRead` stream.
///
/// Decoding is incremental: the reader pulls exactly the bytes a value needs
/// and never reads ahead into the next one.
pub struct AsyncValueReader<R> {
    reader: R,
    limits: Limits,
}

impl<R: AsyncRead + Unpin + Send> AsyncValueReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, Limits::default())
    }

    pub fn with_limits(reader: R, limits: Limits) -> Self {
        Self { reader, limits }
    }

    /// Reads the next value.
    pub async fn read_value(&mut self) -> Result<Value> {
        let result = self.read_value_at(0).await;
        match &result {
            Ok(value) => tracing::trace!(tag = %value.tag(), "read value"),
            Err(e) => tracing::debug!(error = %e, "value decode failed"),
        }
        result
    }

    /// Reads the next value as `T`, failing fast if its tag does not fit.
    pub async fn read_as<T: FromValue>(&mut self) -> Result<T> {
        let tag = self.read_tag().await?;
        if !T::accepts(tag) {
            tracing::debug!(expected = %T::EXPECTED, found = %tag, "typed decode failed");
            return Err(AetherError::TypeMismatch {
                expected: T::EXPECTED,
                found: tag,
            });
        }
        T::from_value(self.read_payload(tag, 0).await?)
    }

    pub async fn read_list<T: FromValue>(&mut self) -> Result<Vec<T>> {
        self.read_as().await
    }

    pub async fn read_dict<K, V>(&mut self) -> Result<IndexMap<K, V>>
    where
        K: FromValue + std::hash::Hash + Eq,
        V: FromValue,
    {
        self.read_as().await
    }

    /// Reads a bare varint size, with no tag in front.
    pub async fn read_size(&mut self) -> Result<i64> {
        let mut decoder = VarintDecoder::new();
        loop {
            let byte = self.reader.read_u8().await?;
            if let Some(value) = decoder.push(byte)? {
                return Ok(value as i64);
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    async fn read_tag(&mut self) -> Result<Tag> {
        Tag::try_from(self.reader.read_u8().await?)
    }

    // Boxed so container payloads can recurse.
    fn read_value_at(&mut self, depth: usize) -> BoxedRead<'_> {
        Box::pin(async move {
            let tag = self.read_tag().await?;
            self.read_payload(tag, depth).await
        })
    }

    async fn read_payload(&mut self, tag: Tag, depth: usize) -> Result<Value> {
        if let Some(width) = tag.payload_width() {
            let mut scratch = [0u8; 8];
            let payload = &mut scratch[..width];
            self.reader.read_exact(payload).await?;
            return scalar_from_le_bytes(tag, payload);
        }

        let size = self.read_size().await?;
        let len = self.limits.check_size(size)?;
        match tag {
            Tag::String => string_from_utf8(self.read_blob(len).await?).map(Value::String),
            Tag::Bytes => Ok(Value::Bytes(self.read_blob(len).await?)),
            Tag::List => {
                let depth = self.limits.enter(depth)?;
                let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
                for _ in 0..len {
                    items.push(self.read_value_at(depth).await?);
                }
                Ok(Value::List(items))
            }
            Tag::Dict => {
                let depth = self.limits.enter(depth)?;
                let mut dict = Dict::with_capacity(len.min(MAX_PREALLOC));
                for _ in 0..len {
                    let key = self.read_value_at(depth).await?;
                    let value = self.read_value_at(depth).await?;
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }
            scalar => Err(AetherError::Format(format!(
                "{scalar} has a fixed-width payload, not a size"
            ))),
        }
    }

    async fn read_blob(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(len.min(MAX_PREALLOC));
        (&mut self.reader).take(len as u64).read_to_end(&mut data).await?;
        if data.len() < len {
            return Err(AetherError::UnexpectedEof);
        }
        Ok(data)
    }
}

/// Writes Aether values to an `AsyncWrite` stream.
///
/// Each value is encoded into a reused buffer and written in full before
/// `write_value` returns, so nothing is left behind when the writer drops.
pub struct AsyncValueWriter<W> {
    writer: W,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> AsyncValueWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: BytesMut::new(),
        }
    }

    /// Encodes and writes one value.
    ///
    /// A failed write may leave part of the value in the stream.
    pub async fn write_value(&mut self, value: &Value) -> Result<()> {
        self.buf.clear();
        encode::encode_value(&mut self.buf, value);
        tracing::trace!(tag = %value.tag(), len = self.buf.len(), "writing value");
        self.writer.write_all(&self.buf).await?;
        Ok(())
    }

    pub async fn write(&mut self, value: impl Into<Value>) -> Result<()> {
        self.write_value(&value.into()).await
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Flushes and shuts down the underlying stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
