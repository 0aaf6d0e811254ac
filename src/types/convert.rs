//! Typed projections out of [`Value`].

use std::hash::Hash;

use indexmap::IndexMap;

use super::Value;
use crate::codec::Tag;
use crate::error::{AetherError, Result};

/// A Rust type that can be taken out of a decoded [`Value`].
///
/// Projections never widen or reinterpret: an `Int8` is not an `i64`, and a
/// list of `UInt8` is not a byte blob. A value of the wrong kind yields
/// [`AetherError::TypeMismatch`].
pub trait FromValue: Sized {
    /// The kind reported when a mismatching value is found.
    const EXPECTED: Tag;

    /// Returns `true` if a value opened by `tag` can be projected into `Self`.
    ///
    /// Typed reads check this before consuming the payload.
    fn accepts(tag: Tag) -> bool {
        tag == Self::EXPECTED
    }

    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: Tag, found: &Value) -> AetherError {
    AetherError::TypeMismatch {
        expected,
        found: found.tag(),
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl FromValue for $ty {
            const EXPECTED: Tag = Tag::$variant;

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(Self::EXPECTED, &other)),
                }
            }
        }
    )*};
}

impl_from_value!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => String,
);

impl FromValue for bool {
    const EXPECTED: Tag = Tag::True;

    fn accepts(tag: Tag) -> bool {
        matches!(tag, Tag::True | Tag::False)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }
}

/// Byte blobs project into [`bytes::Bytes`].
impl FromValue for bytes::Bytes {
    const EXPECTED: Tag = Tag::Bytes;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(bytes::Bytes::from(b)),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }
}

/// Any value; never mismatches.
impl FromValue for Value {
    const EXPECTED: Tag = Tag::Null;

    fn accepts(_: Tag) -> bool {
        true
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

/// `Null` becomes `None`; anything else must project into `T`.
impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: Tag = T::EXPECTED;

    fn accepts(tag: Tag) -> bool {
        tag == Tag::Null || T::accepts(tag)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: Tag = Tag::List;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }
}

/// Keys and values are projected pair by pair. Keys that become equal after
/// projection keep the last value.
impl<K, V> FromValue for IndexMap<K, V>
where
    K: FromValue + Hash + Eq,
    V: FromValue,
{
    const EXPECTED: Tag = Tag::Dict;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Dict(dict) => dict
                .into_iter()
                .map(|(k, v)| -> Result<(K, V)> { Ok((K::from_value(k)?, V::from_value(v)?)) })
                .collect(),
            other => Err(mismatch(Self::EXPECTED, &other)),
        }
    }
}

impl Value {
    /// Projects this value into `T`, failing on a kind mismatch.
    pub fn into_typed<T: FromValue>(self) -> Result<T> {
        T::from_value(self)
    }
}
