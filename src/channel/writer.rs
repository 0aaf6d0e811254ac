//! Writes values to a blocking byte sink.

use std::io::{self, Write};

use bytes::BytesMut;

use crate::codec::encode;
use crate::error::Result;
use crate::types::Value;

/// Staged bytes are pushed to the sink once they reach this size.
const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Writes Aether values to a `Write` sink through a staging buffer.
///
/// Call [`finish`](Self::finish) to flush and get the sink back. Dropping the
/// writer flushes whatever is still staged, but a failure there can only be
/// logged.
pub struct ValueWriter<W: Write> {
    writer: Option<W>,
    buf: BytesMut,
    capacity: usize,
}

impl<W: Write> ValueWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, writer)
    }

    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Self {
            writer: Some(writer),
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Encodes `value` into the staging buffer, flushing it to the sink once
    /// it is full.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        encode::encode_value(&mut self.buf, value);
        tracing::trace!(tag = %value.tag(), staged = self.buf.len(), "wrote value");
        if self.buf.len() >= self.capacity {
            self.write_staged()?;
        }
        Ok(())
    }

    /// Converts and writes anything that has a `Value` form.
    pub fn write(&mut self, value: impl Into<Value>) -> Result<()> {
        self.write_value(&value.into())
    }

    /// Bytes encoded but not yet handed to the sink.
    pub fn staged(&self) -> &[u8] {
        &self.buf
    }

    /// Pushes staged bytes to the sink and flushes it.
    pub fn flush(&mut self) -> Result<()> {
        self.write_staged()?;
        self.sink()?.flush()?;
        Ok(())
    }

    /// Flushes and returns the sink.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        // With the sink taken, `Drop` has nothing left to do.
        let writer = self.writer.take().ok_or_else(finished)?;
        Ok(writer)
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    // Staged bytes are discarded even if the write fails.
    fn write_staged(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let writer = self.writer.as_mut().ok_or_else(finished)?;
        let result = writer.write_all(&self.buf);
        self.buf.clear();
        result?;
        Ok(())
    }

    fn sink(&mut self) -> io::Result<&mut W> {
        self.writer.as_mut().ok_or_else(finished)
    }
}

fn finished() -> io::Error {
    io::Error::other("value writer already finished")
}

impl<W: Write> Drop for ValueWriter<W> {
    fn drop(&mut self) {
        if self.writer.is_none() || self.buf.is_empty() {
            return;
        }
        let pending = self.buf.len();
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, pending, "failed to flush value writer on drop");
        }
    }
}
