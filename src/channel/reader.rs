//! Reads values from a blocking byte source.

use std::io::{BufReader, Read};

use indexmap::IndexMap;

use crate::codec::{decode, varint, Limits};
use crate::error::Result;
use crate::types::{FromValue, Value};

/// Reads Aether values one after another from a `Read` source.
///
/// Reads pull a byte at a time for tags and sizes, so wrap raw files and
/// sockets with [`ValueReader::buffered`]. After any error the source position
/// is undefined and the reader should be dropped.
pub struct ValueReader<R> {
    reader: R,
    limits: Limits,
}

impl<R: Read> ValueReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, Limits::default())
    }

    pub fn with_limits(reader: R, limits: Limits) -> Self {
        Self { reader, limits }
    }

    /// Wraps `reader` in a [`BufReader`] first.
    pub fn buffered(reader: R) -> ValueReader<BufReader<R>> {
        ValueReader::new(BufReader::new(reader))
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Reads the next value.
    pub fn read_value(&mut self) -> Result<Value> {
        match decode::read_value(&mut self.reader, &self.limits) {
            Ok(value) => {
                tracing::trace!(tag = %value.tag(), "read value");
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "value decode failed");
                Err(e)
            }
        }
    }

    /// Reads the next value as `T`, failing fast if its tag does not fit.
    pub fn read_as<T: FromValue>(&mut self) -> Result<T> {
        decode::read_as(&mut self.reader, &self.limits).inspect_err(|e| {
            tracing::debug!(error = %e, expected = %T::EXPECTED, "typed decode failed");
        })
    }

    /// Reads a list whose elements all project into `T`.
    pub fn read_list<T: FromValue>(&mut self) -> Result<Vec<T>> {
        self.read_as()
    }

    /// Reads a dictionary whose keys and values project into `K` and `V`.
    pub fn read_dict<K, V>(&mut self) -> Result<IndexMap<K, V>>
    where
        K: FromValue + std::hash::Hash + Eq,
        V: FromValue,
    {
        self.read_as()
    }

    /// Reads a bare varint size, with no tag in front.
    pub fn read_size(&mut self) -> Result<i64> {
        varint::decode_size(&mut self.reader)
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
